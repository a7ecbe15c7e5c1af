//! Statistical hypothesis tests comparing the two treatment arms.

pub mod chisq;
pub mod proportion;

pub use chisq::{test_chi2_independence, ChiSquareResult};
pub use mann_whitney::{test_mann_whitney, MannWhitneyMethod, MannWhitneyResult};
pub use normality::{test_shapiro, NormalityResult};
pub use proportion::{test_proportions_z, ProportionTestResult};

use serde::{Deserialize, Serialize};

/// Default significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Outcome of comparing a p-value against a significance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Significant,
    NotSignificant,
    /// The p-value is NaN (degenerate input).
    Undefined,
}

impl Significance {
    /// Classify a p-value at level `alpha`.
    pub fn classify(p_value: f64, alpha: f64) -> Self {
        if p_value.is_nan() {
            Self::Undefined
        } else if p_value < alpha {
            Self::Significant
        } else {
            Self::NotSignificant
        }
    }

    /// Check if significant. NaN is never significant.
    pub fn is_significant(&self) -> bool {
        matches!(self, Self::Significant)
    }

    /// Label for a difference-in-proportions test.
    pub fn difference_label(&self) -> &'static str {
        match self {
            Self::Significant => "Significant",
            Self::NotSignificant => "Not significant",
            Self::Undefined => "Undefined",
        }
    }

    /// Label for an independence test.
    pub fn association_label(&self) -> &'static str {
        match self {
            Self::Significant => "Dependent",
            Self::NotSignificant => "No association",
            Self::Undefined => "Undefined",
        }
    }
}

/// Format a p-value to four decimals, or "undefined" for NaN.
pub fn format_p_value(p_value: f64) -> String {
    if p_value.is_nan() {
        "undefined".to_string()
    } else {
        format!("{:.4}", p_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Significance::classify(0.01, 0.05), Significance::Significant);
        assert_eq!(Significance::classify(0.05, 0.05), Significance::NotSignificant);
        assert_eq!(Significance::classify(f64::NAN, 0.05), Significance::Undefined);
        assert!(!Significance::classify(f64::NAN, 0.05).is_significant());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Significance::Significant.association_label(), "Dependent");
        assert_eq!(Significance::NotSignificant.association_label(), "No association");
        assert_eq!(Significance::NotSignificant.difference_label(), "Not significant");
    }

    #[test]
    fn test_format_p_value() {
        assert_eq!(format_p_value(0.123456), "0.1235");
        assert_eq!(format_p_value(f64::NAN), "undefined");
    }
}
