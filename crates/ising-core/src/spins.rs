//! Spin configurations of a one dimensional chain.

use std::fmt;

use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, IsingError};
use crate::rng::RngHandle;

/// Largest chain length accepted by [`SpinConfig1D::new`].
pub const MAX_SITES: usize = 1 << 20;

/// Spin state of a 1D chain.
///
/// Each site holds `0` (down) or `1` (up). The chain length is fixed at
/// construction. Integer encodings are read most-significant bit first: site
/// `0` holds bit `N - 1` and site `N - 1` holds bit `0`, so the binary string
/// of the encoding reads left to right in site order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SpinConfigRepr", into = "SpinConfigRepr")]
pub struct SpinConfig1D {
    spins: Vec<u8>,
    pbc: bool,
}

#[derive(Serialize, Deserialize)]
struct SpinConfigRepr {
    pbc: bool,
    spins: Vec<u8>,
}

impl TryFrom<SpinConfigRepr> for SpinConfig1D {
    type Error = IsingError;

    fn try_from(repr: SpinConfigRepr) -> Result<Self, Self::Error> {
        check_size(repr.spins.len())?;
        if let Some(pos) = repr.spins.iter().position(|&s| s > 1) {
            return Err(IsingError::Serde(
                ErrorInfo::new("spin-value", "spins must be 0 or 1")
                    .with_context("site", pos)
                    .with_context("value", repr.spins[pos]),
            ));
        }
        Ok(Self {
            spins: repr.spins,
            pbc: repr.pbc,
        })
    }
}

impl From<SpinConfig1D> for SpinConfigRepr {
    fn from(config: SpinConfig1D) -> Self {
        Self {
            pbc: config.pbc,
            spins: config.spins,
        }
    }
}

fn check_size(sites: usize) -> Result<(), IsingError> {
    if sites == 0 || sites > MAX_SITES {
        return Err(IsingError::InvalidSize(
            ErrorInfo::new("chain-size", "chain length must lie in [1, MAX_SITES]")
                .with_context("sites", sites)
                .with_context("max_sites", MAX_SITES),
        ));
    }
    Ok(())
}

impl SpinConfig1D {
    /// Creates an all-down chain of `sites` spins.
    pub fn new(sites: usize, pbc: bool) -> Result<Self, IsingError> {
        check_size(sites)?;
        Ok(Self {
            spins: vec![0; sites],
            pbc,
        })
    }

    /// Number of sites `N`.
    pub fn num_sites(&self) -> usize {
        self.spins.len()
    }

    /// Whether the last site neighbours the first.
    pub fn pbc(&self) -> bool {
        self.pbc
    }

    /// Read-only view of the spin values.
    pub fn spins(&self) -> &[u8] {
        &self.spins
    }

    /// Returns the spin at `site`.
    pub fn get(&self, site: usize) -> Result<u8, IsingError> {
        self.check_index(site)?;
        Ok(self.spins[site])
    }

    /// Toggles the spin at `site`.
    pub fn flip_site(&mut self, site: usize) -> Result<(), IsingError> {
        self.check_index(site)?;
        self.spins[site] ^= 1;
        Ok(())
    }

    /// Resets the chain and sets exactly `up` distinct sites, chosen uniformly
    /// without replacement, to up.
    pub fn initialize_with_magnetization(
        &mut self,
        up: usize,
        rng: &mut RngHandle,
    ) -> Result<(), IsingError> {
        let sites = self.num_sites();
        if up > sites {
            return Err(IsingError::InvalidMagnetization(
                ErrorInfo::new("up-count", "number of up spins must lie in [0, N]")
                    .with_context("up", up)
                    .with_context("sites", sites),
            ));
        }
        self.spins.iter_mut().for_each(|s| *s = 0);
        for site in index::sample(rng, sites, up).into_iter() {
            self.spins[site] = 1;
        }
        Ok(())
    }

    /// Sets the chain from the binary expansion of `value`.
    pub fn set_from_integer(&mut self, value: u64) -> Result<(), IsingError> {
        let sites = self.num_sites();
        if sites < 64 && value >> sites != 0 {
            return Err(IsingError::EncodingRange(
                ErrorInfo::new("encoding-range", "encoding must lie in [0, 2^N)")
                    .with_context("value", value)
                    .with_context("sites", sites),
            ));
        }
        for (site, spin) in self.spins.iter_mut().enumerate() {
            let bit = sites - 1 - site;
            *spin = if bit < 64 { ((value >> bit) & 1) as u8 } else { 0 };
        }
        Ok(())
    }

    /// Inverse of [`SpinConfig1D::set_from_integer`].
    ///
    /// Fails when the chain holds an up spin above bit 63.
    pub fn to_integer(&self) -> Result<u64, IsingError> {
        let sites = self.num_sites();
        let mut value = 0u64;
        for (site, &spin) in self.spins.iter().enumerate() {
            let bit = sites - 1 - site;
            if spin == 1 {
                if bit >= 64 {
                    return Err(IsingError::EncodingRange(
                        ErrorInfo::new("encoding-overflow", "configuration does not fit in u64")
                            .with_context("site", site),
                    ));
                }
                value |= 1 << bit;
            }
        }
        Ok(value)
    }

    /// Number of up spins.
    pub fn count_up(&self) -> usize {
        self.spins.iter().filter(|&&s| s == 1).count()
    }

    /// Signed magnetization `#up - #down`.
    pub fn magnetization(&self) -> i64 {
        2 * self.count_up() as i64 - self.num_sites() as i64
    }

    fn check_index(&self, site: usize) -> Result<(), IsingError> {
        if site >= self.num_sites() {
            return Err(IsingError::IndexOutOfRange(
                ErrorInfo::new("site-index", "site index must lie in [0, N)")
                    .with_context("site", site)
                    .with_context("sites", self.num_sites()),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for SpinConfig1D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for spin in &self.spins {
            write!(f, "{spin}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty_chain() {
        assert!(matches!(
            SpinConfig1D::new(0, true),
            Err(IsingError::InvalidSize(_))
        ));
        assert!(matches!(
            SpinConfig1D::new(MAX_SITES + 1, false),
            Err(IsingError::InvalidSize(_))
        ));
        let config = SpinConfig1D::new(4, false).unwrap();
        assert_eq!(config.spins(), &[0, 0, 0, 0]);
        assert!(!config.pbc());
    }

    #[test]
    fn integer_encoding_is_msb_first() {
        let mut config = SpinConfig1D::new(10, true).unwrap();
        config.set_from_integer(44).unwrap();
        assert_eq!(config.spins(), &[0, 0, 0, 0, 1, 0, 1, 1, 0, 0]);
        assert_eq!(config.to_string(), "0000101100");
        assert_eq!(config.to_integer().unwrap(), 44);
    }

    #[test]
    fn encoding_range_is_checked() {
        let mut config = SpinConfig1D::new(3, true).unwrap();
        config.set_from_integer(5).unwrap();
        let err = config.set_from_integer(8).unwrap_err();
        assert!(matches!(err, IsingError::EncodingRange(_)));
        // rejected call leaves the chain untouched
        assert_eq!(config.spins(), &[1, 0, 1]);
    }

    #[test]
    fn wide_chains_accept_any_u64() {
        let mut config = SpinConfig1D::new(70, false).unwrap();
        config.set_from_integer(u64::MAX).unwrap();
        assert_eq!(config.count_up(), 64);
        assert!(config.spins()[..6].iter().all(|&s| s == 0));
        assert_eq!(config.to_integer().unwrap(), u64::MAX);

        config.flip_site(0).unwrap();
        assert!(matches!(
            config.to_integer(),
            Err(IsingError::EncodingRange(_))
        ));
    }

    #[test]
    fn index_checks() {
        let mut config = SpinConfig1D::new(5, true).unwrap();
        assert!(matches!(config.get(5), Err(IsingError::IndexOutOfRange(_))));
        assert!(matches!(
            config.flip_site(7),
            Err(IsingError::IndexOutOfRange(_))
        ));
        config.flip_site(4).unwrap();
        assert_eq!(config.get(4).unwrap(), 1);
        assert_eq!(config.magnetization(), -3);
    }

    #[test]
    fn magnetization_initialization_sets_exact_count() {
        let mut rng = RngHandle::from_seed(2);
        let mut config = SpinConfig1D::new(10, true).unwrap();
        for up in 0..=10 {
            config.initialize_with_magnetization(up, &mut rng).unwrap();
            assert_eq!(config.count_up(), up);
        }
        assert!(matches!(
            config.initialize_with_magnetization(11, &mut rng),
            Err(IsingError::InvalidMagnetization(_))
        ));
    }

    #[test]
    fn magnetization_initialization_reaches_every_site() {
        let mut rng = RngHandle::from_seed(17);
        let mut config = SpinConfig1D::new(6, false).unwrap();
        let mut hits = [0usize; 6];
        for _ in 0..200 {
            config.initialize_with_magnetization(1, &mut rng).unwrap();
            for (site, &spin) in config.spins().iter().enumerate() {
                hits[site] += spin as usize;
            }
        }
        assert!(hits.iter().all(|&h| h > 0));
    }

    #[test]
    fn magnetization_initialization_is_seed_deterministic() {
        let mut a = SpinConfig1D::new(12, true).unwrap();
        let mut b = SpinConfig1D::new(12, true).unwrap();
        a.initialize_with_magnetization(5, &mut RngHandle::from_seed(9))
            .unwrap();
        b.initialize_with_magnetization(5, &mut RngHandle::from_seed(9))
            .unwrap();
        assert_eq!(a, b);
    }
}
