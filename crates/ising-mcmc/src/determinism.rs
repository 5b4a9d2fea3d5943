use ising_core::{derive_substream_seed, RngHandle};

/// Derives the seed consumed while building the initial configuration.
pub fn init_seed(master_seed: u64) -> u64 {
    derive_substream_seed(master_seed ^ 0xA5A5_A5A5_A5A5_A5A5, 0)
}

/// Derives the seed for the acceptance draws of sweep `sweep`.
pub fn sweep_seed(master_seed: u64, sweep: usize) -> u64 {
    derive_substream_seed(master_seed, sweep as u64)
}

/// RNG handle for the acceptance draws of sweep `sweep`.
pub fn sweep_rng(master_seed: u64, sweep: usize) -> RngHandle {
    RngHandle::from_seed(sweep_seed(master_seed, sweep))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_stream_differs_from_every_early_sweep() {
        let init = init_seed(42);
        assert!((0..1000).all(|sweep| sweep_seed(42, sweep) != init));
        assert_eq!(init_seed(42), init);
    }
}
