//! Benjamini-Hochberg false discovery rate correction.

use crate::data::AdverseEvent;
use crate::error::Result;
use crate::profile::EventIncidence;
use crate::test::{test_proportions_z, ProportionTestResult};
use serde::{Deserialize, Serialize};

/// Result of BH correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BhCorrected {
    /// Test labels in original order.
    pub labels: Vec<String>,
    /// Original p-values.
    pub p_values: Vec<f64>,
    /// Adjusted p-values (q-values). NaN wherever the p-value was NaN.
    pub q_values: Vec<f64>,
    /// Number of tests with a defined p-value.
    pub n_tests: usize,
}

impl BhCorrected {
    /// Get q-value for a specific label.
    pub fn get_qvalue(&self, label: &str) -> Option<f64> {
        let idx = self.labels.iter().position(|l| l == label)?;
        self.q_values.get(idx).copied()
    }

    /// Count significant results at a threshold.
    pub fn n_significant(&self, alpha: f64) -> usize {
        self.q_values.iter().filter(|&&q| q < alpha).count()
    }
}

/// Apply Benjamini-Hochberg FDR correction.
///
/// For each p-value, the adjusted p-value (q-value) is calculated as:
/// q[i] = min(p[i] * m / rank[i], q[i+1])
///
/// NaN p-values are left out of the ranking (they do not count towards m)
/// and stay NaN.
pub fn correct_bh(p_values: &[f64], labels: &[String]) -> BhCorrected {
    let mut q_values = vec![f64::NAN; p_values.len()];

    let mut indices: Vec<usize> = (0..p_values.len())
        .filter(|&i| !p_values[i].is_nan())
        .collect();
    let m = indices.len();

    if m > 0 {
        indices.sort_by(|&a, &b| {
            p_values[a]
                .partial_cmp(&p_values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let m_f64 = m as f64;
        let mut q_sorted = vec![0.0; m];
        q_sorted[m - 1] = p_values[indices[m - 1]].min(1.0);

        // Work backwards from the largest p-value
        for i in (0..m - 1).rev() {
            let rank = i + 1;
            let adjusted = p_values[indices[i]] * m_f64 / rank as f64;
            q_sorted[i] = adjusted.min(q_sorted[i + 1]).min(1.0);
        }

        for (i, &orig_idx) in indices.iter().enumerate() {
            q_values[orig_idx] = q_sorted[i];
        }
    }

    BhCorrected {
        labels: labels.to_vec(),
        p_values: p_values.to_vec(),
        q_values,
        n_tests: m,
    }
}

/// Drug-versus-placebo comparison for one adverse event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventComparison {
    pub event: AdverseEvent,
    /// Two-proportion z-test on the event's incidence.
    pub test: ProportionTestResult,
    /// BH-adjusted p-value across the five events.
    pub q_value: f64,
}

/// Test each adverse event separately and adjust across events.
pub fn compare_events(incidence: &[EventIncidence]) -> Result<Vec<EventComparison>> {
    let tests: Vec<ProportionTestResult> = incidence
        .iter()
        .map(|inc| test_proportions_z(inc.counts, inc.nobs))
        .collect::<Result<_>>()?;

    let p_values: Vec<f64> = tests.iter().map(|t| t.p_value).collect();
    let labels: Vec<String> = incidence.iter().map(|inc| inc.event.column().to_string()).collect();
    let bh = correct_bh(&p_values, &labels);

    Ok(incidence
        .iter()
        .zip(tests)
        .zip(bh.q_values)
        .map(|((inc, test), q_value)| EventComparison {
            event: inc.event,
            test,
            q_value,
        })
        .collect())
}
