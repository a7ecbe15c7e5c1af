//! Chi-square test of independence on the arm × effect-count table.

use crate::data::ContingencyTable;
use crate::error::{Result, SafetyError};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Expected counts below this trigger a warning (the test is still run).
const LOW_EXPECTED_COUNT: f64 = 5.0;

/// Result of a chi-square independence test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChiSquareResult {
    /// Chi-square statistic. NaN when degenerate.
    pub statistic: f64,
    /// P-value. NaN when degenerate.
    pub p_value: f64,
    /// Degrees of freedom, (rows - 1)(observed columns - 1).
    pub dof: usize,
    /// Expected frequencies under independence for every column of the
    /// input table. Columns with no participants hold 0.
    pub expected: DMatrix<f64>,
    /// Whether Yates' continuity correction was applied.
    pub yates_corrected: bool,
    /// Number of expected cells (in tested columns) below 5.
    pub low_expected_cells: usize,
    /// True when the table has no variation to test (dof = 0).
    pub degenerate: bool,
}

/// Test independence of treatment arm and adverse-effect count.
///
/// Only effect-count columns with at least one participant take part in the
/// test. Expected frequencies are `row_total * col_total / grand_total`.
/// With one degree of freedom and `yates` enabled, each observed count is
/// moved up to 0.5 towards its expected value before the statistic is formed.
///
/// If fewer than two effect-count levels are observed the table carries no
/// information about association; the result is marked degenerate with NaN
/// statistic and p-value.
pub fn test_chi2_independence(table: &ContingencyTable, yates: bool) -> Result<ChiSquareResult> {
    let row_totals = table.row_totals();
    if let Some(r) = row_totals.iter().position(|&t| t <= 0.0) {
        return Err(SafetyError::InvalidParameter(format!(
            "Contingency row '{}' is empty",
            table.arms[r]
        )));
    }

    let column_totals = table.column_totals();
    let total = table.total();
    let (n_rows, n_cols) = table.counts.shape();

    let expected = DMatrix::from_fn(n_rows, n_cols, |r, c| {
        row_totals[r] * column_totals[c] / total
    });

    let columns = table.observed_columns();
    let dof = (n_rows - 1) * columns.len().saturating_sub(1);

    if dof == 0 {
        tracing::debug!("chi-square table has a single observed level, result undefined");
        return Ok(ChiSquareResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
            dof,
            expected,
            yates_corrected: false,
            low_expected_cells: 0,
            degenerate: true,
        });
    }

    let yates_corrected = yates && dof == 1;
    let mut statistic = 0.0;
    let mut low_expected_cells = 0;

    for r in 0..n_rows {
        for &c in &columns {
            let e = expected[(r, c)];
            let mut o = table.counts[(r, c)];
            if yates_corrected {
                let diff = e - o;
                o += diff.abs().min(0.5) * diff.signum();
            }
            if e < LOW_EXPECTED_COUNT {
                low_expected_cells += 1;
            }
            statistic += (o - e).powi(2) / e;
        }
    }

    if low_expected_cells > 0 {
        tracing::warn!(
            cells = low_expected_cells,
            "chi-square expected counts below {}; approximation may be poor",
            LOW_EXPECTED_COUNT
        );
    }

    let chi_sq = ChiSquared::new(dof as f64).map_err(|e| SafetyError::InvalidParameter(e.to_string()))?;
    let p_value = chi_sq.sf(statistic).clamp(0.0, 1.0);

    tracing::debug!(chi2 = statistic, dof, p = p_value, "chi-square independence test");

    Ok(ChiSquareResult {
        statistic,
        p_value,
        dof,
        expected,
        yates_corrected,
        low_expected_cells,
        degenerate: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_by_three() {
        let table = ContingencyTable::from_counts([[20, 15, 5, 0, 0, 0], [10, 15, 15, 0, 0, 0]]);
        let result = test_chi2_independence(&table, true).unwrap();

        assert_eq!(result.dof, 2);
        assert!(!result.yates_corrected);
        assert_relative_eq!(result.statistic, 25.0 / 3.0, epsilon = 1e-10);
        assert_relative_eq!(result.p_value, (-25.0f64 / 6.0).exp(), epsilon = 1e-8);
        assert_relative_eq!(result.expected[(0, 0)], 15.0, epsilon = 1e-10);
        assert_relative_eq!(result.expected[(1, 2)], 10.0, epsilon = 1e-10);
        assert_eq!(result.expected[(0, 4)], 0.0);
    }

    #[test]
    fn test_yates_on_two_by_two() {
        let table = ContingencyTable::from_counts([[10, 20, 0, 0, 0, 0], [30, 40, 0, 0, 0, 0]]);

        let corrected = test_chi2_independence(&table, true).unwrap();
        assert_eq!(corrected.dof, 1);
        assert!(corrected.yates_corrected);
        assert_relative_eq!(corrected.statistic, 0.446428571, epsilon = 1e-6);
        assert_relative_eq!(corrected.p_value, 0.5040, epsilon = 1e-3);

        let uncorrected = test_chi2_independence(&table, false).unwrap();
        assert!(!uncorrected.yates_corrected);
        assert_relative_eq!(uncorrected.statistic, 0.793650794, epsilon = 1e-6);
    }

    #[test]
    fn test_no_effects_anywhere_is_degenerate() {
        let table = ContingencyTable::from_counts([[10, 0, 0, 0, 0, 0], [12, 0, 0, 0, 0, 0]]);
        let result = test_chi2_independence(&table, true).unwrap();

        assert!(result.degenerate);
        assert_eq!(result.dof, 0);
        assert!(result.statistic.is_nan());
        assert!(result.p_value.is_nan());
        assert!(result.expected.iter().all(|e| e.is_finite()));
    }

    #[test]
    fn test_identical_rows_no_association() {
        let table = ContingencyTable::from_counts([[50, 30, 15, 5, 0, 0], [50, 30, 15, 5, 0, 0]]);
        let result = test_chi2_independence(&table, true).unwrap();

        assert_relative_eq!(result.statistic, 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.p_value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_low_expected_cells_counted() {
        let table = ContingencyTable::from_counts([[20, 2, 1, 0, 0, 0], [18, 1, 0, 0, 0, 0]]);
        let result = test_chi2_independence(&table, true).unwrap();

        assert!(result.low_expected_cells > 0);
        assert!(result.p_value >= 0.0 && result.p_value <= 1.0);
    }

    #[test]
    fn test_empty_row_is_error() {
        let table = ContingencyTable::from_counts([[0, 0, 0, 0, 0, 0], [12, 3, 0, 0, 0, 0]]);
        assert!(test_chi2_independence(&table, true).is_err());
    }

    #[test]
    fn test_extreme_statistic_keeps_tail_probability() {
        let table = ContingencyTable::from_counts([[100, 0, 0, 0, 0, 0], [0, 100, 0, 0, 0, 0]]);
        let result = test_chi2_independence(&table, true).unwrap();

        // (|100 - 50| - 0.5)^2 / 50 * 4
        assert_relative_eq!(result.statistic, 196.02, epsilon = 1e-9);
        assert!(result.p_value > 0.0);
        assert!(result.p_value < 1e-30);
    }
}
