//! Basis-state codec
//!
//! Conversions between the three representations of a measurement outcome:
//! - basis index: integer in [0, 2^n)
//! - bit-label: fixed-width binary string, most-significant qubit first
//! - count mapping: bit-label -> shot count, absent keys meaning zero
//!
//! Backends report counts keyed by bit-label; the linear algebra wants
//! dense vectors indexed by basis index. All matrix rows/columns and
//! vector positions use the basis-index ordering defined here.

use crate::error::{MitigationError, Result};
use ndarray::Array1;
use std::collections::HashMap;

/// Hilbert space dimension for a qubit count
#[inline]
pub fn dimension(n_qubits: usize) -> usize {
    1 << n_qubits
}

/// Convert a basis index to its n-character zero-padded binary label.
///
/// The leftmost character is the most significant qubit, matching how
/// hardware backends key their count dictionaries.
pub fn index_to_label(index: usize, n_qubits: usize) -> Result<String> {
    let dim = dimension(n_qubits);
    if index >= dim {
        return Err(MitigationError::IndexOutOfRange { index, dim });
    }
    Ok(format!("{:0width$b}", index, width = n_qubits))
}

/// Convert a bit-label back to its basis index.
///
/// Fails unless the label is exactly `n_qubits` characters of '0'/'1'.
pub fn label_to_index(label: &str, n_qubits: usize) -> Result<usize> {
    if label.len() != n_qubits || !label.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(MitigationError::InvalidBitLabel {
            label: label.to_string(),
            n_qubits,
        });
    }
    // Width and alphabet were just checked, so this cannot fail.
    Ok(usize::from_str_radix(label, 2).unwrap_or(0))
}

/// Convert a count mapping to a dense length-2^n vector.
///
/// Position i holds the count for label(i); labels absent from the map
/// contribute zero. The vector keeps raw counts (it is not normalized),
/// so the shot total is recoverable as the vector sum.
///
/// A key that is not a valid n-qubit bit-label means the counts came from
/// a circuit of a different width and is a dimension error.
pub fn counts_to_vector(counts: &HashMap<String, u64>, n_qubits: usize) -> Result<Array1<f64>> {
    let dim = dimension(n_qubits);
    let mut vec = Array1::<f64>::zeros(dim);

    for (label, &count) in counts {
        let index = label_to_index(label, n_qubits).map_err(|_| {
            MitigationError::DimensionMismatch {
                expected: n_qubits,
                found: label.len(),
            }
        })?;
        vec[index] = count as f64;
    }

    Ok(vec)
}

/// Convert a dense vector back to a count mapping.
///
/// Each entry is rounded to the nearest non-negative integer; zero
/// entries are omitted, consistent with absent-means-zero in
/// [`counts_to_vector`].
pub fn vector_to_counts(vector: &Array1<f64>, n_qubits: usize) -> HashMap<String, u64> {
    let mut counts = HashMap::new();

    for (index, &value) in vector.iter().enumerate() {
        let count = value.round().max(0.0) as u64;
        if count > 0 {
            let label = format!("{:0width$b}", index, width = n_qubits);
            counts.insert(label, count);
        }
    }

    counts
}
