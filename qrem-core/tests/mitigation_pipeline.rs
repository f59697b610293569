//! End-to-end pipeline tests: build calibration circuits, execute them on
//! the simulator, assemble the confusion matrix, and correct noisy counts.

use ndarray::Array1;
use qrem_core::{
    calibration_circuits, vector_to_counts, CircuitExecutor, MeasurementMitigator,
    MitigatorConfig, ReadoutNoise, Renormalization, Simulator, SolverPath,
};
use std::collections::HashMap;

#[test]
fn noiseless_pipeline_returns_input_unchanged() {
    let mut mitigator = MeasurementMitigator::new(2).unwrap();
    let mut executor = Simulator::new();
    mitigator.run_calibration(&mut executor, 4096).unwrap();

    // Identity confusion: correction must be a no-op up to rounding.
    let mut noisy = HashMap::new();
    noisy.insert("00".to_string(), 430u64);
    noisy.insert("01".to_string(), 40u64);
    noisy.insert("10".to_string(), 35u64);
    noisy.insert("11".to_string(), 495u64);

    let result = mitigator.mitigate(&noisy).unwrap();
    assert_eq!(result.counts, noisy);
    assert_eq!(result.solver, SolverPath::Direct);
}

#[test]
fn noisy_pipeline_recovers_true_distribution() {
    // Calibrate against a known readout channel with exact counts, push a
    // known true distribution through the same channel, and check the
    // mitigated output lands back on the truth.
    let n_qubits = 2;
    let noise = ReadoutNoise::uniform(n_qubits, 0.04, 0.07);

    let mut mitigator = MeasurementMitigator::new(n_qubits).unwrap();
    let mut executor = Simulator::new().with_noise(noise.clone());
    mitigator.run_calibration(&mut executor, 10_000).unwrap();

    let v_true = Array1::from(vec![5000.0, 0.0, 0.0, 5000.0]);
    let v_noisy = noise.apply(&(v_true.clone() / 10_000.0)) * 10_000.0;
    let noisy_counts = vector_to_counts(&v_noisy, n_qubits);

    let result = mitigator.mitigate(&noisy_counts).unwrap();

    assert!((result.probability(0) - 0.5).abs() < 0.01);
    assert!((result.probability(3) - 0.5).abs() < 0.01);
    assert!(result.probability(1) < 0.01);
    assert!(result.probability(2) < 0.01);
}

#[test]
fn sampled_calibration_still_mitigates() {
    // Multinomial sampling instead of exact counts: correction quality drops
    // with shot noise but the recovered distribution stays close.
    let n_qubits = 1;
    let noise = ReadoutNoise::uniform(n_qubits, 0.05, 0.05);

    let mut mitigator = MeasurementMitigator::new(n_qubits).unwrap();
    let mut executor = Simulator::new()
        .with_noise(noise.clone())
        .with_sampling(Some(1234));
    mitigator.run_calibration(&mut executor, 20_000).unwrap();

    let v_true = Array1::from(vec![800.0, 200.0]);
    let v_noisy = noise.apply(&(v_true.clone() / 1000.0)) * 1000.0;
    let result = mitigator
        .mitigate(&vector_to_counts(&v_noisy, n_qubits))
        .unwrap();

    assert!((result.probability(0) - 0.8).abs() < 0.05);
    assert!((result.probability(1) - 0.2).abs() < 0.05);
}

#[test]
fn recalibration_after_noise_change() {
    let n_qubits = 1;
    let mut mitigator = MeasurementMitigator::new(n_qubits).unwrap();

    let mut quiet = Simulator::new().with_noise(ReadoutNoise::uniform(n_qubits, 0.01, 0.01));
    mitigator.run_calibration(&mut quiet, 10_000).unwrap();
    let quiet_diag = mitigator.matrix().unwrap().entry(0, 0);

    // Backend drifts; rerunning calibration must overwrite the stored matrix.
    let mut loud = Simulator::new().with_noise(ReadoutNoise::uniform(n_qubits, 0.10, 0.10));
    mitigator.run_calibration(&mut loud, 10_000).unwrap();
    let loud_diag = mitigator.matrix().unwrap().entry(0, 0);

    assert!((quiet_diag - 0.99).abs() < 1e-9);
    assert!((loud_diag - 0.90).abs() < 1e-9);
}

#[test]
fn renormalization_policies_differ_on_clamped_output() {
    let n_qubits = 1;
    let noise = ReadoutNoise::uniform(n_qubits, 0.05, 0.05);
    let calibration = {
        let mut executor = Simulator::new().with_noise(noise);
        executor
            .execute(&calibration_circuits(n_qubits).unwrap(), 10_000)
            .unwrap()
    };

    // An input more extreme than anything the channel could produce forces
    // a negative entry out of the solve.
    let mut extreme = HashMap::new();
    extreme.insert("0".to_string(), 1000u64);

    let mut preserving = MeasurementMitigator::with_config(
        n_qubits,
        MitigatorConfig::new().with_renormalization(Renormalization::ShotTotal),
    )
    .unwrap();
    preserving.calibrate(&calibration).unwrap();
    let kept = preserving.mitigate(&extreme).unwrap();

    let mut raw = MeasurementMitigator::with_config(
        n_qubits,
        MitigatorConfig::new().with_renormalization(Renormalization::Disabled),
    )
    .unwrap();
    raw.calibrate(&calibration).unwrap();
    let unkept = raw.mitigate(&extreme).unwrap();

    assert!(kept.negative_mass > 0.0);
    assert_eq!(kept.counts.values().sum::<u64>(), 1000);
    assert!(unkept.counts.values().sum::<u64>() > 1000);
}

#[test]
fn calibration_set_shapes() {
    for n in 1..=4 {
        let circuits = calibration_circuits(n).unwrap();
        assert_eq!(circuits.len(), 1 << n);
        for (j, c) in circuits.iter().enumerate() {
            assert_eq!(c.basis_index(), j);
            assert_eq!(c.prepared_label().len(), n);
        }
    }
}
