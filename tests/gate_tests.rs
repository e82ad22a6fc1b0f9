use frostrift::gate::{GateMode, SpawnGate};

#[test]
fn coins_gate_compares_against_min_coins() {
    let gate = SpawnGate::coins(10);
    assert!(!gate.reached(9, 0.0));
    assert!(gate.reached(10, 0.0));
    assert!(gate.reached(11, 0.0));
}

#[test]
fn zero_coin_gate_is_immediately_reached() {
    let gate = SpawnGate::coins(0);
    assert!(gate.reached(0, 0.0));
}

#[test]
fn distance_gate_ignores_coins() {
    let gate = SpawnGate::distance(500.0);
    assert!(!gate.reached(999, 499.9));
    assert!(gate.reached(0, 500.0));
}

#[test]
fn combined_gate_requires_both_thresholds() {
    let gate = SpawnGate::coins_and_distance(7, 300.0);
    assert!(!gate.reached(7, 299.0), "coins alone must not open the gate");
    assert!(!gate.reached(6, 300.0), "distance alone must not open the gate");
    assert!(gate.reached(7, 300.0));
}

#[test]
fn unknown_mode_falls_back_to_coins_check() {
    let gate = SpawnGate {
        mode: GateMode::Other("coins singular unknown".to_string()),
        min_coins: 7,
        min_distance: 10_000.0,
    };
    assert!(!gate.reached(6, 0.0));
    assert!(gate.reached(7, 0.0), "fallback must ignore the distance field");
}
