use ising_core::{Field, IsingHamiltonian1D, SpinConfig1D};

#[test]
fn spin_config_round_trips_json() {
    let mut config = SpinConfig1D::new(6, false).unwrap();
    config.set_from_integer(0b101101).unwrap();

    let json = serde_json::to_string(&config).expect("serialize");
    assert_eq!(json, r#"{"pbc":false,"spins":[1,0,1,1,0,1]}"#);
    let decoded: SpinConfig1D = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, config);
}

#[test]
fn spin_config_rejects_invalid_payloads() {
    assert!(serde_json::from_str::<SpinConfig1D>(r#"{"pbc":true,"spins":[]}"#).is_err());
    assert!(serde_json::from_str::<SpinConfig1D>(r#"{"pbc":true,"spins":[0,2]}"#).is_err());
}

#[test]
fn hamiltonian_round_trips_json() {
    let ham = IsingHamiltonian1D::new(-1.0, Field::Sites(vec![0.5, 1.0, -0.25]), 0.1, true);
    let json = serde_json::to_string_pretty(&ham).expect("serialize");
    let decoded: IsingHamiltonian1D = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, ham);
}
