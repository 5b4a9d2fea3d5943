//! Nearest-neighbour Ising Hamiltonian on a 1D chain.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, IsingError};
use crate::spins::SpinConfig1D;

/// On-site field profile `h`.
///
/// Deserializes from either a bare number (uniform field) or a list with one
/// entry per site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    /// Same field strength on every site.
    Uniform(f64),
    /// Explicit per-site field strengths.
    Sites(Vec<f64>),
}

impl Field {
    /// Field strength at `site`.
    ///
    /// Callers must have checked the profile length against the chain.
    pub(crate) fn at(&self, site: usize) -> f64 {
        match self {
            Field::Uniform(h) => *h,
            Field::Sites(values) => values[site],
        }
    }
}

impl Default for Field {
    fn default() -> Self {
        Field::Uniform(1.0)
    }
}

/// Energy model
///
/// ```text
/// E = sum_<ij> (s_i == s_j ? -J : +J) + sum_i (s_i up ? -mu h_i : +mu h_i)
/// ```
///
/// The evaluator holds no configuration state. `coupling` (J) and `mu` are
/// public so parameter sweeps can reassign them between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsingHamiltonian1D {
    /// Nearest-neighbour coupling `J`.
    pub coupling: f64,
    /// Field coupling scale.
    pub mu: f64,
    field: Field,
    pbc: bool,
}

impl IsingHamiltonian1D {
    /// Creates a Hamiltonian with an explicit field profile.
    pub fn new(coupling: f64, field: Field, mu: f64, pbc: bool) -> Self {
        Self {
            coupling,
            mu,
            field,
            pbc,
        }
    }

    /// Creates a Hamiltonian with the same field `h` on every site.
    pub fn uniform(coupling: f64, h: f64, mu: f64, pbc: bool) -> Self {
        Self::new(coupling, Field::Uniform(h), mu, pbc)
    }

    /// Field profile.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Whether the wraparound bond is included.
    pub fn pbc(&self) -> bool {
        self.pbc
    }

    /// Checks that `config` can be evaluated by this Hamiltonian.
    pub fn check_compatible(&self, config: &SpinConfig1D) -> Result<(), IsingError> {
        self.check_sites(config.num_sites(), config.pbc())
    }

    /// Same check as [`IsingHamiltonian1D::check_compatible`] for a chain
    /// described by its length and boundary flag.
    pub fn check_sites(&self, sites: usize, pbc: bool) -> Result<(), IsingError> {
        if pbc != self.pbc {
            return Err(IsingError::Model(
                ErrorInfo::new(
                    "boundary-mismatch",
                    "hamiltonian and configuration disagree on periodic boundaries",
                )
                .with_context("hamiltonian_pbc", self.pbc)
                .with_context("config_pbc", pbc),
            ));
        }
        if let Field::Sites(values) = &self.field {
            if values.len() != sites {
                return Err(IsingError::Model(
                    ErrorInfo::new("field-length", "field profile length must equal N")
                        .with_context("field_len", values.len())
                        .with_context("sites", sites),
                ));
            }
        }
        Ok(())
    }

    /// Total energy of `config`.
    pub fn energy(&self, config: &SpinConfig1D) -> Result<f64, IsingError> {
        self.check_compatible(config)?;
        Ok(self.bond_term(config.spins()) + self.field_term(config.spins()))
    }

    /// Coupling contribution only.
    pub fn bond_energy(&self, config: &SpinConfig1D) -> Result<f64, IsingError> {
        self.check_compatible(config)?;
        Ok(self.bond_term(config.spins()))
    }

    /// Field contribution only.
    pub fn field_energy(&self, config: &SpinConfig1D) -> Result<f64, IsingError> {
        self.check_compatible(config)?;
        Ok(self.field_term(config.spins()))
    }

    /// Energy change that flipping `site` would cause, computed from the bonds
    /// touching the site and its field term. `config` is not modified.
    pub fn delta_energy_for_flip(
        &self,
        site: usize,
        config: &SpinConfig1D,
    ) -> Result<f64, IsingError> {
        self.check_compatible(config)?;
        let spin = config.get(site)?;
        let spins = config.spins();
        let sites = spins.len();

        let left = if site > 0 {
            Some(site - 1)
        } else if self.pbc {
            Some(sites - 1)
        } else {
            None
        };
        let right = if site + 1 < sites {
            Some(site + 1)
        } else if self.pbc {
            Some(0)
        } else {
            None
        };

        // A site that is its own neighbour (N = 1 ring) never changes alignment.
        let bond: f64 = [left, right]
            .into_iter()
            .flatten()
            .filter(|&other| other != site)
            .map(|other| {
                if spins[other] == spin {
                    2.0 * self.coupling
                } else {
                    -2.0 * self.coupling
                }
            })
            .sum();

        let field = 2.0 * self.mu * self.field.at(site);
        Ok(if spin == 1 { bond + field } else { bond - field })
    }

    fn bond_term(&self, spins: &[u8]) -> f64 {
        let pair = |a: u8, b: u8| {
            if a == b {
                -self.coupling
            } else {
                self.coupling
            }
        };
        let mut energy: f64 = spins.windows(2).map(|w| pair(w[0], w[1])).sum();
        if self.pbc {
            if let (Some(&last), Some(&first)) = (spins.last(), spins.first()) {
                energy += pair(last, first);
            }
        }
        energy
    }

    fn field_term(&self, spins: &[u8]) -> f64 {
        spins
            .iter()
            .enumerate()
            .map(|(site, &spin)| {
                let h = self.mu * self.field.at(site);
                if spin == 1 {
                    -h
                } else {
                    h
                }
            })
            .sum()
    }
}
