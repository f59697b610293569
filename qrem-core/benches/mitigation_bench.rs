use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qrem_core::{
    calibration_circuits, CircuitExecutor, ConfusionMatrix, MeasurementMitigator, ReadoutNoise,
    Simulator,
};
use std::collections::HashMap;

fn calibration_counts(n_qubits: usize) -> Vec<HashMap<String, u64>> {
    let mut executor = Simulator::new().with_noise(ReadoutNoise::uniform(n_qubits, 0.02, 0.03));
    executor
        .execute(&calibration_circuits(n_qubits).unwrap(), 8192)
        .unwrap()
}

fn bench_matrix_build(c: &mut Criterion) {
    // Matrix assembly is O(4^n); 6 qubits = 64x64
    for n_qubits in [3usize, 6] {
        let results = calibration_counts(n_qubits);
        c.bench_function(&format!("confusion_from_counts_{}q", n_qubits), |b| {
            b.iter(|| ConfusionMatrix::from_counts(black_box(&results), n_qubits).unwrap())
        });
    }
}

fn bench_mitigate(c: &mut Criterion) {
    // Correction is dominated by the O(8^n) elimination
    for n_qubits in [3usize, 6] {
        let mut mitigator = MeasurementMitigator::new(n_qubits).unwrap();
        let mut executor =
            Simulator::new().with_noise(ReadoutNoise::uniform(n_qubits, 0.02, 0.03));
        mitigator.run_calibration(&mut executor, 8192).unwrap();

        let mut noisy = HashMap::new();
        noisy.insert("0".repeat(n_qubits), 500u64);
        noisy.insert("1".repeat(n_qubits), 500u64);

        c.bench_function(&format!("mitigate_{}q", n_qubits), |b| {
            b.iter(|| mitigator.mitigate(black_box(&noisy)).unwrap())
        });
    }
}

criterion_group!(benches, bench_matrix_build, bench_mitigate);
criterion_main!(benches);
