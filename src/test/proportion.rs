//! Two-sample z-test for equality of proportions.

use crate::error::{Result, SafetyError};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Result of a pooled two-proportion z-test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProportionTestResult {
    /// Successes per group.
    pub counts: [u64; 2],
    /// Observations per group.
    pub nobs: [u64; 2],
    /// Observed proportion per group.
    pub proportions: [f64; 2],
    /// Pooled proportion under H0.
    pub pooled: f64,
    /// Difference of proportions (first minus second).
    pub difference: f64,
    /// z statistic. NaN when the pooled variance is zero.
    pub statistic: f64,
    /// Two-sided p-value. NaN when the statistic is undefined.
    pub p_value: f64,
}

/// Test H0: p1 = p2 against a two-sided alternative.
///
/// Uses the pooled-variance standard error
/// `sqrt(p̂(1 - p̂)(1/n1 + 1/n2))` with `p̂ = (x1 + x2) / (n1 + n2)`.
/// When every observation is a success, or none is, the variance is zero
/// and both statistic and p-value are NaN.
///
/// # Arguments
/// * `counts` - Number of successes in each group
/// * `nobs` - Number of observations in each group
pub fn test_proportions_z(counts: [u64; 2], nobs: [u64; 2]) -> Result<ProportionTestResult> {
    for (i, (&x, &n)) in counts.iter().zip(nobs.iter()).enumerate() {
        if n == 0 {
            return Err(SafetyError::InvalidParameter(format!(
                "Group {} has no observations",
                i + 1
            )));
        }
        if x > n {
            return Err(SafetyError::InvalidParameter(format!(
                "Group {} has {} successes out of {} observations",
                i + 1,
                x,
                n
            )));
        }
    }

    let n1 = nobs[0] as f64;
    let n2 = nobs[1] as f64;
    let p1 = counts[0] as f64 / n1;
    let p2 = counts[1] as f64 / n2;
    let pooled = (counts[0] + counts[1]) as f64 / (n1 + n2);

    let variance = pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2);
    let difference = p1 - p2;

    let statistic = if variance > 0.0 {
        difference / variance.sqrt()
    } else {
        f64::NAN
    };

    let p_value = if statistic.is_nan() {
        f64::NAN
    } else {
        let normal = Normal::new(0.0, 1.0).map_err(|e| SafetyError::InvalidParameter(e.to_string()))?;
        (2.0 * normal.sf(statistic.abs())).min(1.0)
    };

    tracing::debug!(z = statistic, p = p_value, "two-proportion z-test");

    Ok(ProportionTestResult {
        counts,
        nobs,
        proportions: [p1, p2],
        pooled,
        difference,
        statistic,
        p_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equal_proportions() {
        let result = test_proportions_z([30, 30], [100, 100]).unwrap();

        assert_relative_eq!(result.statistic, 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.p_value, 1.0, epsilon = 1e-12);
        assert_relative_eq!(result.pooled, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_known_values() {
        // pooled = 0.35, se = sqrt(0.35 * 0.65 * 0.02) = 0.067454
        let result = test_proportions_z([40, 30], [100, 100]).unwrap();

        assert_relative_eq!(result.difference, 0.1, epsilon = 1e-12);
        assert_relative_eq!(result.statistic, 1.482499, epsilon = 1e-5);
        assert_relative_eq!(result.p_value, 0.138206, epsilon = 1e-4);
    }

    #[test]
    fn test_strong_difference() {
        let result = test_proportions_z([80, 20], [100, 100]).unwrap();

        assert!(result.statistic > 8.0);
        assert!(result.p_value < 1e-10);
    }

    #[test]
    fn test_sign_follows_first_group() {
        let result = test_proportions_z([10, 40], [100, 100]).unwrap();
        assert!(result.statistic < 0.0);
    }

    #[test]
    fn test_zero_variance_is_nan() {
        let none = test_proportions_z([0, 0], [50, 60]).unwrap();
        assert!(none.statistic.is_nan());
        assert!(none.p_value.is_nan());

        let all = test_proportions_z([50, 60], [50, 60]).unwrap();
        assert!(all.p_value.is_nan());
    }

    #[test]
    fn test_empty_group() {
        assert!(test_proportions_z([0, 3], [0, 10]).is_err());
    }

    #[test]
    fn test_counts_exceed_nobs() {
        assert!(test_proportions_z([11, 3], [10, 10]).is_err());
    }

    #[test]
    fn test_extreme_difference_keeps_tail_probability() {
        // z is about 12; 1 - cdf rounds this to zero
        let result = test_proportions_z([80, 20], [100, 100]).unwrap();

        assert!(result.p_value > 0.0);
        assert!(result.p_value < 1e-20);
    }
}
