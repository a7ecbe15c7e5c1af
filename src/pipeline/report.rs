//! Report views produced by the analysis pipeline.

use crate::chart::{render_bars, render_histogram, AgeHistograms, BarSeries};
use crate::correct::EventComparison;
use crate::data::{ContingencyTable, TreatmentArm};
use crate::error::Result;
use crate::profile::TrialSummary;
use crate::test::{
    format_p_value, ChiSquareResult, MannWhitneyResult, NormalityResult, ProportionTestResult,
    Significance,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trial overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewView {
    pub summary: TrialSummary,
}

/// Side-effect incidence and effect-count comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideEffectView {
    /// Two-proportion z-test on any adverse effect.
    pub proportion: ProportionTestResult,
    pub proportion_significance: Significance,
    /// Adverse-effect rate per arm.
    pub rates: BarSeries,
    /// Chi-square test of arm × effect count.
    pub chi_square: ChiSquareResult,
    pub association: Significance,
    pub contingency: ContingencyTable,
    /// Per-event comparisons with BH-adjusted q-values.
    pub events: Vec<EventComparison>,
}

/// Age distribution comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeView {
    pub shapiro_drug: NormalityResult,
    pub shapiro_placebo: NormalityResult,
    pub mann_whitney: MannWhitneyResult,
    pub age_difference: Significance,
    pub histograms: AgeHistograms,
}

/// Plain-language conclusions drawn from the three comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conclusion {
    pub lines: Vec<String>,
}

impl Conclusion {
    /// Derive conclusions from the test classifications.
    pub fn from_views(side_effects: &SideEffectView, age: &AgeView) -> Self {
        let proportion = match side_effects.proportion_significance {
            Significance::Significant => format!(
                "Significant difference in the proportion of participants with side effects \
                 (Drug {:.1}% vs Placebo {:.1}%).",
                side_effects.proportion.proportions[0] * 100.0,
                side_effects.proportion.proportions[1] * 100.0
            ),
            Significance::NotSignificant => {
                "No significant difference in the proportion of participants with side effects."
                    .to_string()
            }
            Significance::Undefined => {
                "The difference in side-effect proportions is undefined for this data.".to_string()
            }
        };

        let association = match side_effects.association {
            Significance::Significant => {
                "The number of side effects per participant depends on treatment.".to_string()
            }
            Significance::NotSignificant => {
                "No evidence that the number of side effects depends on treatment.".to_string()
            }
            Significance::Undefined => {
                "Association between treatment and number of side effects could not be tested."
                    .to_string()
            }
        };

        let age_line = match age.age_difference {
            Significance::Significant => {
                "Age distributions differ between arms; age may confound the comparison."
                    .to_string()
            }
            Significance::NotSignificant => {
                "Age distributions are similar; age is not a confounder.".to_string()
            }
            Significance::Undefined => {
                "Age distributions could not be compared.".to_string()
            }
        };

        Self {
            lines: vec![proportion, association, age_line],
        }
    }
}

/// Complete output of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyReport {
    /// Analysis name.
    pub name: String,
    /// Significance level used.
    pub alpha: f64,
    pub overview: OverviewView,
    pub side_effects: SideEffectView,
    pub age: AgeView,
    pub conclusion: Conclusion,
}

impl SafetyReport {
    /// Serialize to pretty JSON. NaN values become `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl fmt::Display for OverviewView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Overview")?;
        writeln!(f, "========")?;
        write!(f, "{}", self.summary)
    }
}

impl fmt::Display for SideEffectView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Side Effects")?;
        writeln!(f, "============")?;
        writeln!(f, "1. Proportion with Side Effects")?;
        writeln!(
            f,
            "  Z-Test P-value: {}  (z = {:.4})",
            format_p_value(self.proportion.p_value),
            self.proportion.statistic
        )?;
        writeln!(f, "  {}", self.proportion_significance.difference_label())?;
        write!(f, "{}", render_bars(&self.rates))?;
        writeln!(f)?;

        writeln!(f, "2. Number of Side Effects per Person")?;
        writeln!(
            f,
            "  Chi-Square P-value: {}  (chi2 = {:.4}, dof = {})",
            format_p_value(self.chi_square.p_value),
            self.chi_square.statistic,
            self.chi_square.dof
        )?;
        writeln!(f, "  {}", self.association.association_label())?;
        write!(f, "{}", self.contingency)?;
        writeln!(f)?;

        writeln!(f, "3. Individual Side Effects")?;
        for comparison in &self.events {
            writeln!(
                f,
                "  {:<28} Drug {:>5.1}%  Placebo {:>5.1}%  p = {}  q = {}",
                comparison.event.label(),
                comparison.test.proportions[0] * 100.0,
                comparison.test.proportions[1] * 100.0,
                format_p_value(comparison.test.p_value),
                format_p_value(comparison.q_value)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for AgeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Age Analysis")?;
        writeln!(f, "============")?;
        writeln!(f, "  Shapiro (Drug):    {}", format_p_value(self.shapiro_drug.p_value))?;
        writeln!(f, "  Shapiro (Placebo): {}", format_p_value(self.shapiro_placebo.p_value))?;
        writeln!(f, "  Mann-Whitney P:    {}", format_p_value(self.mann_whitney.p_value))?;
        writeln!(f)?;
        for arm in TreatmentArm::ALL {
            let title = format!("Age Distribution ({})", arm);
            write!(f, "{}", render_histogram(&title, self.histograms.get(arm)))?;
        }
        Ok(())
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conclusion")?;
        writeln!(f, "==========")?;
        for line in &self.lines {
            writeln!(f, "  - {}", line)?;
        }
        Ok(())
    }
}

impl fmt::Display for SafetyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Drug Safety Report: {}", self.name)?;
        writeln!(f, "(alpha = {})", self.alpha)?;
        writeln!(f)?;
        writeln!(f, "{}", self.overview)?;
        writeln!(f, "{}", self.side_effects)?;
        writeln!(f, "{}", self.age)?;
        write!(f, "{}", self.conclusion)
    }
}
