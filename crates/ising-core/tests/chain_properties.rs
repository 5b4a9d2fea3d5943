use ising_core::{Field, IsingHamiltonian1D, SpinConfig1D};
use proptest::prelude::*;

fn chain(sites: usize, pbc: bool, value: u64) -> SpinConfig1D {
    let mut config = SpinConfig1D::new(sites, pbc).unwrap();
    config.set_from_integer(value % (1u64 << sites)).unwrap();
    config
}

fn hamiltonian(
    sites: usize,
    pbc: bool,
    coupling: f64,
    mu: f64,
    fields: Vec<f64>,
) -> IsingHamiltonian1D {
    IsingHamiltonian1D::new(coupling, Field::Sites(fields[..sites].to_vec()), mu, pbc)
}

proptest! {
    #[test]
    fn flip_twice_restores_site(
        sites in 1usize..16,
        pbc in any::<bool>(),
        value in any::<u64>(),
        site in 0usize..16,
    ) {
        let site = site % sites;
        let mut config = chain(sites, pbc, value);
        let before = config.clone();
        config.flip_site(site).unwrap();
        prop_assert_ne!(config.get(site).unwrap(), before.get(site).unwrap());
        config.flip_site(site).unwrap();
        prop_assert_eq!(config, before);
    }

    #[test]
    fn encoding_round_trips(sites in 1usize..=20, value in any::<u64>()) {
        let value = value % (1u64 << sites);
        let config = chain(sites, true, value);
        prop_assert_eq!(config.to_integer().unwrap(), value);
    }

    #[test]
    fn delta_matches_two_evaluations(
        sites in 1usize..12,
        pbc in any::<bool>(),
        value in any::<u64>(),
        coupling in -2.0f64..2.0,
        mu in -2.0f64..2.0,
        fields in proptest::collection::vec(-1.5f64..1.5, 12),
    ) {
        let ham = hamiltonian(sites, pbc, coupling, mu, fields);
        let config = chain(sites, pbc, value);
        let base = ham.energy(&config).unwrap();
        for site in 0..sites {
            let delta = ham.delta_energy_for_flip(site, &config).unwrap();
            let mut flipped = config.clone();
            flipped.flip_site(site).unwrap();
            let direct = ham.energy(&flipped).unwrap() - base;
            prop_assert!((delta - direct).abs() < 1e-9, "site {}: {} vs {}", site, delta, direct);
        }
    }

    #[test]
    fn global_reversal_keeps_bonds_and_negates_field(
        sites in 1usize..12,
        pbc in any::<bool>(),
        value in any::<u64>(),
        coupling in -2.0f64..2.0,
        mu in -2.0f64..2.0,
        h in -1.5f64..1.5,
    ) {
        let ham = IsingHamiltonian1D::uniform(coupling, h, mu, pbc);
        let config = chain(sites, pbc, value);
        let mut reversed = config.clone();
        for site in 0..sites {
            reversed.flip_site(site).unwrap();
        }
        prop_assert_eq!(ham.bond_energy(&reversed).unwrap(), ham.bond_energy(&config).unwrap());
        let field_sum = ham.field_energy(&reversed).unwrap() + ham.field_energy(&config).unwrap();
        prop_assert!(field_sum.abs() < 1e-12);
        prop_assert_eq!(reversed.magnetization(), -config.magnetization());
    }
}
