use sgld_utils::optimal_temperature;

#[test]
fn test_optimal_temperature() {
    let expected = 100.0 / (100.0f64).ln();
    let actual = optimal_temperature(100).unwrap() as f64;
    assert!((actual - expected).abs() < 1e-4);
}

#[test]
fn test_optimal_temperature_grows_with_batch_size() {
    let small = optimal_temperature(16).unwrap();
    let large = optimal_temperature(1024).unwrap();
    assert!(large > small);
    assert!(small > 1.0);
}

#[test]
fn test_optimal_temperature_rejects_tiny_batches() {
    assert!(optimal_temperature(0).is_err());
    assert!(optimal_temperature(1).is_err());
}
