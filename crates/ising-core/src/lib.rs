#![deny(missing_docs)]
//! Spin-chain state, the 1D Ising Hamiltonian and the error and RNG types shared by the
//! Ising crates.

pub mod errors;
pub mod hamiltonian;
pub mod rng;
pub mod spins;

pub use errors::{check_temperature, ErrorInfo, IsingError};
pub use hamiltonian::{Field, IsingHamiltonian1D};
pub use rng::{derive_substream_seed, RngHandle};
pub use spins::{SpinConfig1D, MAX_SITES};
