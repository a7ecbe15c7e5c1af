//! Equal-width histogram binning.

use crate::error::{Result, SafetyError};
use serde::{Deserialize, Serialize};

/// Histogram with equal-width bins.
///
/// `edges` has `counts.len() + 1` entries. Every bin is half-open
/// `[edge_i, edge_{i+1})` except the last, which also includes its right edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bin values into `bins` equal-width bins spanning their min and max.
    ///
    /// When all values are equal the range is widened to `[v - 0.5, v + 0.5]`.
    pub fn from_values(values: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(SafetyError::InvalidParameter(
                "Histogram needs at least one bin".to_string(),
            ));
        }
        if values.is_empty() {
            return Err(SafetyError::InvalidParameter(
                "Cannot build a histogram from no values".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SafetyError::InvalidParameter(
                "Histogram input contains non-finite values".to_string(),
            ));
        }

        let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { lo + width * i as f64 })
            .collect();

        let mut counts = vec![0u64; bins];
        for &v in values {
            let mut idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            // Floating-point rounding can land a value one bin off its edges.
            if idx > 0 && v < edges[idx] {
                idx -= 1;
            } else if idx + 1 < bins && v >= edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        Ok(Self { edges, counts })
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    /// Total number of binned values.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}
