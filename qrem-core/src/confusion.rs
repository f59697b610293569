//! Confusion matrix assembly and linear solve
//!
//! The confusion matrix M is 2^n x 2^n with M[i][j] = P(measured i | prepared j),
//! assembled column-by-column from the calibration circuit counts. Each column
//! is a conditional probability distribution and sums to 1 up to sampling noise.
//!
//! Correction solves M x = v. Gaussian elimination with partial pivoting is
//! attempted first; when the pivots reveal an ill-conditioned system (sparse
//! calibration shots can do this) the solve falls back to damped normal
//! equations, minimizing ||Mx - v||.

use crate::bitstring::{counts_to_vector, dimension};
use crate::error::{MitigationError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pivot magnitude below which a system counts as singular
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Pivot-ratio threshold for routing to the least-squares fallback
const CONDITION_LIMIT: f64 = 1e12;

/// Relative Tikhonov damping applied in the least-squares fallback
const DAMPING_FACTOR: f64 = 1e-8;

/// Which solve path produced a corrected vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverPath {
    /// Well-conditioned system, direct elimination
    Direct,
    /// Ill-conditioned system, damped normal equations
    LeastSquares,
}

/// Measured-vs-prepared confusion statistics for the full basis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    n_qubits: usize,
    matrix: Array2<f64>,
}

impl ConfusionMatrix {
    /// Assemble the matrix from per-basis-state calibration counts.
    ///
    /// `calibration_results[j]` holds the outcome counts of the calibration
    /// circuit preparing basis state j; column j becomes that distribution
    /// normalized by its own shot total. A basis state with zero recorded
    /// shots fails the whole calibration.
    pub fn from_counts(
        calibration_results: &[HashMap<String, u64>],
        n_qubits: usize,
    ) -> Result<Self> {
        if n_qubits == 0 {
            return Err(MitigationError::InvalidQubitCount(n_qubits));
        }
        let dim = dimension(n_qubits);
        if calibration_results.len() != dim {
            return Err(MitigationError::CalibrationSizeMismatch {
                expected: dim,
                found: calibration_results.len(),
            });
        }

        let mut matrix = Array2::<f64>::zeros((dim, dim));

        for (j, counts) in calibration_results.iter().enumerate() {
            let column = counts_to_vector(counts, n_qubits)?;
            let shots = column.sum();
            if shots <= 0.0 {
                return Err(MitigationError::ZeroCalibrationShots { basis_index: j });
            }
            for i in 0..dim {
                matrix[[i, j]] = column[i] / shots;
            }
        }

        let built = Self { n_qubits, matrix };
        debug_assert!(
            built.columns_normalized(1e-6),
            "confusion matrix columns must each sum to 1"
        );
        Ok(built)
    }

    /// Identity confusion: a perfect, noiseless readout
    pub fn identity(n_qubits: usize) -> Result<Self> {
        if n_qubits == 0 {
            return Err(MitigationError::InvalidQubitCount(n_qubits));
        }
        Ok(Self {
            n_qubits,
            matrix: Array2::eye(dimension(n_qubits)),
        })
    }

    /// Build from a plain 2D row-major array, e.g. deserialized by a caller
    pub fn from_rows(rows: Vec<Vec<f64>>, n_qubits: usize) -> Result<Self> {
        if n_qubits == 0 {
            return Err(MitigationError::InvalidQubitCount(n_qubits));
        }
        let dim = dimension(n_qubits);
        if rows.len() != dim || rows.iter().any(|r| r.len() != dim) {
            return Err(MitigationError::DimensionMismatch {
                expected: dim,
                found: rows.len(),
            });
        }

        let mut matrix = Array2::<f64>::zeros((dim, dim));
        for (i, row) in rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }
        Ok(Self { n_qubits, matrix })
    }

    /// Export as a plain 2D row-major array
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.matrix
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect()
    }

    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Matrix dimension 2^n
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// P(measured i | prepared j)
    pub fn entry(&self, measured: usize, prepared: usize) -> f64 {
        self.matrix[[measured, prepared]]
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Check that every column sums to 1 within the given tolerance
    pub fn columns_normalized(&self, tolerance: f64) -> bool {
        (0..self.dim()).all(|j| {
            let sum: f64 = self.matrix.column(j).sum();
            (sum - 1.0).abs() <= tolerance
        })
    }

    /// Solve M x = v, reporting which path produced the solution.
    ///
    /// Direct elimination first; on ill-conditioning, damped normal
    /// equations. A matrix with no usable signal at all (e.g. all zeros)
    /// fails rather than returning garbage.
    pub fn solve(&self, rhs: &Array1<f64>) -> Result<(Array1<f64>, SolverPath)> {
        let dim = self.dim();
        if rhs.len() != dim {
            return Err(MitigationError::DimensionMismatch {
                expected: dim,
                found: rhs.len(),
            });
        }

        let magnitude = self.matrix.iter().fold(0.0_f64, |m, &v| m.max(v.abs()));
        if magnitude < PIVOT_TOLERANCE {
            return Err(MitigationError::SingularMatrix(
                "matrix has no nonzero entries".into(),
            ));
        }

        if let Some(solution) = gaussian_solve(&self.matrix, rhs) {
            return Ok((solution, SolverPath::Direct));
        }

        let solution = self.least_squares(rhs)?;
        Ok((solution, SolverPath::LeastSquares))
    }

    /// Damped normal equations: (M^T M + lambda I) x = M^T v
    fn least_squares(&self, rhs: &Array1<f64>) -> Result<Array1<f64>> {
        let dim = self.dim();
        let mt = self.matrix.t();
        let mut normal = mt.dot(&self.matrix);
        let projected = mt.dot(rhs);

        let diag_max = (0..dim).fold(0.0_f64, |m, i| m.max(normal[[i, i]].abs()));
        let damping = (diag_max * DAMPING_FACTOR).max(PIVOT_TOLERANCE);
        for i in 0..dim {
            normal[[i, i]] += damping;
        }

        gaussian_solve(&normal, &projected).ok_or_else(|| {
            MitigationError::SingularMatrix("least-squares fallback failed to pivot".into())
        })
    }
}

/// Gaussian elimination with partial pivoting.
///
/// Returns None when a pivot falls below tolerance or the pivot-magnitude
/// ratio exceeds the conditioning limit, signalling the caller to fall back.
fn gaussian_solve(matrix: &Array2<f64>, rhs: &Array1<f64>) -> Option<Array1<f64>> {
    let dim = rhs.len();
    let mut a = matrix.clone();
    let mut b = rhs.clone();

    let mut min_pivot = f64::INFINITY;
    let mut max_pivot = 0.0_f64;

    for col in 0..dim {
        // Partial pivot: largest magnitude in the remaining column
        let mut pivot_row = col;
        for row in (col + 1)..dim {
            if a[[row, col]].abs() > a[[pivot_row, col]].abs() {
                pivot_row = row;
            }
        }
        if pivot_row != col {
            for k in 0..dim {
                let tmp = a[[col, k]];
                a[[col, k]] = a[[pivot_row, k]];
                a[[pivot_row, k]] = tmp;
            }
            b.swap(col, pivot_row);
        }

        let pivot = a[[col, col]];
        if pivot.abs() < PIVOT_TOLERANCE {
            return None;
        }
        min_pivot = min_pivot.min(pivot.abs());
        max_pivot = max_pivot.max(pivot.abs());

        for row in (col + 1)..dim {
            let factor = a[[row, col]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..dim {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    if max_pivot / min_pivot > CONDITION_LIMIT {
        return None;
    }

    // Back substitution
    let mut x = Array1::<f64>::zeros(dim);
    for row in (0..dim).rev() {
        let mut sum = b[row];
        for k in (row + 1)..dim {
            sum -= a[[row, k]] * x[k];
        }
        x[row] = sum / a[[row, row]];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|&(l, c)| (l.to_string(), c)).collect()
    }

    #[test]
    fn test_from_counts_single_qubit() {
        let results = vec![
            counts(&[("0", 950), ("1", 50)]),
            counts(&[("0", 40), ("1", 960)]),
        ];
        let m = ConfusionMatrix::from_counts(&results, 1).unwrap();

        assert!((m.entry(0, 0) - 0.95).abs() < 1e-12);
        assert!((m.entry(1, 0) - 0.05).abs() < 1e-12);
        assert!((m.entry(0, 1) - 0.04).abs() < 1e-12);
        assert!((m.entry(1, 1) - 0.96).abs() < 1e-12);
    }

    #[test]
    fn test_columns_sum_to_one() {
        let results = vec![
            counts(&[("00", 880), ("01", 60), ("10", 50), ("11", 10)]),
            counts(&[("00", 70), ("01", 900), ("11", 30)]),
            counts(&[("00", 40), ("10", 930), ("11", 30)]),
            counts(&[("01", 45), ("10", 55), ("11", 900)]),
        ];
        let m = ConfusionMatrix::from_counts(&results, 2).unwrap();
        assert!(m.columns_normalized(1e-6));
    }

    #[test]
    fn test_uneven_shot_totals_still_normalize() {
        // Columns stay individually valid distributions even when shot
        // totals differ across basis states.
        let results = vec![
            counts(&[("0", 400), ("1", 100)]),
            counts(&[("0", 50), ("1", 1950)]),
        ];
        let m = ConfusionMatrix::from_counts(&results, 1).unwrap();
        assert!(m.columns_normalized(1e-9));
        assert!((m.entry(0, 0) - 0.8).abs() < 1e-12);
        assert!((m.entry(1, 1) - 0.975).abs() < 1e-12);
    }

    #[test]
    fn test_zero_shots_fails() {
        let results = vec![counts(&[("0", 1000)]), HashMap::new()];
        let err = ConfusionMatrix::from_counts(&results, 1).unwrap_err();
        assert!(matches!(
            err,
            MitigationError::ZeroCalibrationShots { basis_index: 1 }
        ));
    }

    #[test]
    fn test_wrong_result_count_fails() {
        let results = vec![counts(&[("0", 1000)])];
        let err = ConfusionMatrix::from_counts(&results, 1).unwrap_err();
        assert!(matches!(
            err,
            MitigationError::CalibrationSizeMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_identity_solve_returns_input() {
        let m = ConfusionMatrix::identity(2).unwrap();
        let v = Array1::from(vec![500.0, 100.0, 300.0, 100.0]);

        let (x, path) = m.solve(&v).unwrap();
        assert_eq!(path, SolverPath::Direct);
        for i in 0..4 {
            assert!((x[i] - v[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_solve_recovers_true_distribution() {
        // v_noisy = M . v_true, so solving must recover v_true.
        let m = ConfusionMatrix::from_rows(
            vec![vec![0.95, 0.04], vec![0.05, 0.96]],
            1,
        )
        .unwrap();
        let v_true = Array1::from(vec![500.0, 500.0]);
        let v_noisy = m.matrix().dot(&v_true);

        let (x, path) = m.solve(&v_noisy).unwrap();
        assert_eq!(path, SolverPath::Direct);
        assert!((x[0] - 500.0).abs() < 1e-6);
        assert!((x[1] - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_all_zero_matrix_fails() {
        let m = ConfusionMatrix::from_rows(vec![vec![0.0, 0.0], vec![0.0, 0.0]], 1).unwrap();
        let v = Array1::from(vec![10.0, 20.0]);
        assert!(matches!(
            m.solve(&v).unwrap_err(),
            MitigationError::SingularMatrix(_)
        ));
    }

    #[test]
    fn test_singular_matrix_takes_least_squares_path() {
        // Identical columns: rank 1, direct elimination must bail out.
        let m =
            ConfusionMatrix::from_rows(vec![vec![0.5, 0.5], vec![0.5, 0.5]], 1).unwrap();
        let v = Array1::from(vec![400.0, 600.0]);

        let (x, path) = m.solve(&v).unwrap();
        assert_eq!(path, SolverPath::LeastSquares);
        // Least-squares solution of a rank-1 system splits the mass evenly.
        assert!((x[0] - x[1]).abs() < 1e-3);
        assert!(((x[0] + x[1]) - 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_rows_round_trip() {
        let rows = vec![vec![0.9, 0.2], vec![0.1, 0.8]];
        let m = ConfusionMatrix::from_rows(rows.clone(), 1).unwrap();
        assert_eq!(m.to_rows(), rows);
    }

    #[test]
    fn test_serde_round_trip() {
        // Callers may persist the matrix between sessions; no canonical
        // format beyond a plain 2D float array is promised.
        let m = ConfusionMatrix::from_rows(vec![vec![0.9, 0.2], vec![0.1, 0.8]], 1).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        let back: ConfusionMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_from_rows_shape_check() {
        assert!(ConfusionMatrix::from_rows(vec![vec![1.0]], 1).is_err());
        assert!(ConfusionMatrix::from_rows(vec![vec![1.0, 0.0]], 1).is_err());
    }
}
