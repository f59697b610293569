//! Readout noise model and shot sampling
//!
//! Models the classical readout channel only: each qubit independently
//! misreports 0 as 1 with probability `p_flip_01` and 1 as 0 with
//! `p_flip_10`. Applied to an ideal outcome distribution this produces the
//! noisy distribution a device would sample from. Gate noise is out of
//! scope; readout is the error this engine calibrates away.

use ndarray::Array1;
use rand::prelude::*;
use rand::SeedableRng;
use std::collections::HashMap;

/// Single-qubit readout flip rates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QubitReadoutRates {
    /// P(1|0) - probability of measuring 1 when prepared 0
    pub p_flip_01: f64,
    /// P(0|1) - probability of measuring 0 when prepared 1
    pub p_flip_10: f64,
}

impl Default for QubitReadoutRates {
    fn default() -> Self {
        // Typical transmon readout asymmetry
        Self {
            p_flip_01: 0.015,
            p_flip_10: 0.025,
        }
    }
}

/// Per-qubit readout error channel
#[derive(Debug, Clone)]
pub struct ReadoutNoise {
    rates: Vec<QubitReadoutRates>,
}

impl ReadoutNoise {
    /// Same flip rates on every qubit
    pub fn uniform(n_qubits: usize, p_flip_01: f64, p_flip_10: f64) -> Self {
        let rates = vec![
            QubitReadoutRates {
                p_flip_01: p_flip_01.clamp(0.0, 1.0),
                p_flip_10: p_flip_10.clamp(0.0, 1.0),
            };
            n_qubits
        ];
        Self { rates }
    }

    /// Individual flip rates per qubit
    pub fn from_rates(rates: Vec<QubitReadoutRates>) -> Self {
        Self { rates }
    }

    /// No readout error at all
    pub fn ideal(n_qubits: usize) -> Self {
        Self::uniform(n_qubits, 0.0, 0.0)
    }

    pub fn n_qubits(&self) -> usize {
        self.rates.len()
    }

    pub fn rates(&self) -> &[QubitReadoutRates] {
        &self.rates
    }

    /// 2x2 confusion block for one qubit: [[1-p01, p10], [p01, 1-p10]]
    pub fn single_qubit_matrix(&self, qubit: usize) -> [[f64; 2]; 2] {
        let r = &self.rates[qubit];
        [
            [1.0 - r.p_flip_01, r.p_flip_10],
            [r.p_flip_01, 1.0 - r.p_flip_10],
        ]
    }

    /// Push an ideal outcome distribution through the readout channel.
    ///
    /// Sweeps one qubit at a time, mixing each state with its bit-flipped
    /// partner, so the cost stays O(n * 2^n) instead of O(4^n).
    pub fn apply(&self, probs: &Array1<f64>) -> Array1<f64> {
        let dim = probs.len();
        let mut current = probs.clone();

        for (q, r) in self.rates.iter().enumerate() {
            if r.p_flip_01 == 0.0 && r.p_flip_10 == 0.0 {
                continue;
            }

            let mut next = Array1::<f64>::zeros(dim);
            for state in 0..dim {
                let partner = state ^ (1 << q);
                if (state >> q) & 1 == 0 {
                    next[state] = (1.0 - r.p_flip_01) * current[state]
                        + r.p_flip_10 * current[partner];
                } else {
                    next[state] =
                        r.p_flip_01 * current[partner] + (1.0 - r.p_flip_10) * current[state];
                }
            }
            current = next;
        }

        current
    }
}

/// Shot-based sampler over an outcome distribution
#[derive(Debug)]
pub struct ShotSampler {
    rng: StdRng,
}

impl ShotSampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Sample a single outcome index
    pub fn sample_once(&mut self, probs: &Array1<f64>) -> usize {
        let r: f64 = self.rng.gen();
        let mut cumulative = 0.0;

        for (i, &p) in probs.iter().enumerate() {
            cumulative += p;
            if r < cumulative {
                return i;
            }
        }

        probs.len() - 1
    }

    /// Sample a full count mapping, keyed by bit-label
    pub fn sample_counts(
        &mut self,
        probs: &Array1<f64>,
        shots: u64,
        n_qubits: usize,
    ) -> HashMap<String, u64> {
        let mut counts: HashMap<usize, u64> = HashMap::new();
        for _ in 0..shots {
            *counts.entry(self.sample_once(probs)).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(index, count)| {
                (format!("{:0width$b}", index, width = n_qubits), count)
            })
            .collect()
    }
}

/// Deterministic counts with the exact expected frequencies.
///
/// Floors each expected count, then hands the leftover shots to the largest
/// remainders so the total always equals `shots`. Lets noiseless calibration
/// reproduce the identity confusion matrix exactly.
pub fn exact_counts(probs: &Array1<f64>, shots: u64, n_qubits: usize) -> HashMap<String, u64> {
    let expected: Vec<f64> = probs.iter().map(|&p| p * shots as f64).collect();
    let mut counts: Vec<u64> = expected.iter().map(|&e| e.floor() as u64).collect();

    let assigned: u64 = counts.iter().sum();
    let mut leftover = shots.saturating_sub(assigned);

    let mut by_remainder: Vec<usize> = (0..expected.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = expected[a] - expected[a].floor();
        let rb = expected[b] - expected[b].floor();
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
    });

    for &index in &by_remainder {
        if leftover == 0 {
            break;
        }
        counts[index] += 1;
        leftover -= 1;
    }

    counts
        .into_iter()
        .enumerate()
        .filter(|&(_, c)| c > 0)
        .map(|(index, count)| {
            (format!("{:0width$b}", index, width = n_qubits), count)
        })
        .collect()
}
