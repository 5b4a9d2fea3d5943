//! Structured error types shared across the Ising crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`IsingError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (sites, indices, temperatures, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the Ising engine.
///
/// Every variant is a synchronous precondition failure: the call that returns
/// it has not mutated any state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum IsingError {
    /// Chain length is zero or beyond the supported maximum.
    #[error("invalid size: {0}")]
    InvalidSize(ErrorInfo),
    /// Requested number of up spins lies outside `[0, N]`.
    #[error("invalid magnetization: {0}")]
    InvalidMagnetization(ErrorInfo),
    /// Integer encoding lies outside `[0, 2^N)`.
    #[error("encoding out of range: {0}")]
    EncodingRange(ErrorInfo),
    /// Site index lies outside `[0, N)`.
    #[error("index out of range: {0}")]
    IndexOutOfRange(ErrorInfo),
    /// Temperature is not a finite positive number.
    #[error("invalid temperature: {0}")]
    InvalidTemperature(ErrorInfo),
    /// Exact enumeration would exceed the configured budget.
    #[error("size too large: {0}")]
    SizeTooLarge(ErrorInfo),
    /// Hamiltonian and configuration disagree (boundary flag, field length) or
    /// run parameters are inconsistent.
    #[error("model error: {0}")]
    Model(ErrorInfo),
    /// Serialization, schema and filesystem errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl IsingError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            IsingError::InvalidSize(info)
            | IsingError::InvalidMagnetization(info)
            | IsingError::EncodingRange(info)
            | IsingError::IndexOutOfRange(info)
            | IsingError::InvalidTemperature(info)
            | IsingError::SizeTooLarge(info)
            | IsingError::Model(info)
            | IsingError::Serde(info) => info,
        }
    }

    /// Wraps an I/O or (de)serialization failure touching `path`.
    pub fn serde(code: &str, err: impl ToString, path: &std::path::Path) -> Self {
        IsingError::Serde(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display()),
        )
    }
}

/// Validates that `temperature` is finite and strictly positive.
pub fn check_temperature(temperature: f64) -> Result<(), IsingError> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(())
    } else {
        Err(IsingError::InvalidTemperature(
            ErrorInfo::new("temperature-nonpositive", "temperature must be finite and > 0")
                .with_context("temperature", temperature),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context_and_hint() {
        let info = ErrorInfo::new("E1", "bad")
            .with_context("site", 3)
            .with_hint("use a smaller index");
        let rendered = IsingError::IndexOutOfRange(info).to_string();
        assert_eq!(
            rendered,
            "index out of range: bad (code: E1) | context: [site=3] | hint: use a smaller index"
        );
    }

    #[test]
    fn temperature_guard_rejects_zero_negative_and_nan() {
        assert!(check_temperature(0.5).is_ok());
        for t in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_temperature(t),
                Err(IsingError::InvalidTemperature(_))
            ));
        }
    }
}
