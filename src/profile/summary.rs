//! Trial overview: enrolment split, adverse-effect rates and ages per arm.

use crate::data::{ParticipantTable, TreatmentArm};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Adverse-effect rate for each arm (the bar-chart input).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmRates {
    /// Proportion of Drug participants with any adverse effect.
    pub drug: f64,
    /// Proportion of Placebo participants with any adverse effect.
    pub placebo: f64,
}

impl ArmRates {
    /// Rate for one arm.
    pub fn get(&self, arm: TreatmentArm) -> f64 {
        match arm {
            TreatmentArm::Drug => self.drug,
            TreatmentArm::Placebo => self.placebo,
        }
    }
}

/// Per-arm descriptive statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmSummary {
    pub arm: TreatmentArm,
    /// Number of participants.
    pub participants: usize,
    /// Participants with at least one adverse effect.
    pub with_adverse_effect: usize,
    /// Proportion with at least one adverse effect.
    pub adverse_rate: f64,
    /// Mean number of distinct adverse-event types.
    pub mean_effect_count: f64,
    pub mean_age: f64,
    pub min_age: f64,
    pub max_age: f64,
}

/// Overview of the whole trial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSummary {
    /// Total participants.
    pub total_participants: usize,
    /// Percentage of participants in the Drug arm.
    pub drug_percent: f64,
    /// Percentage of participants in the Placebo arm.
    pub placebo_percent: f64,
    /// Percentage of all participants with any adverse effect.
    pub overall_adverse_percent: f64,
    /// Adverse-effect rate per arm.
    pub rates: ArmRates,
    /// Per-arm details, Drug first.
    pub arms: Vec<ArmSummary>,
}

impl TrialSummary {
    /// Summary for one arm.
    pub fn arm(&self, arm: TreatmentArm) -> Option<&ArmSummary> {
        self.arms.iter().find(|a| a.arm == arm)
    }
}

impl std::fmt::Display for TrialSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Trial Summary")?;
        writeln!(f, "  Total participants:       {}", self.total_participants)?;
        writeln!(f, "  Drug group (%):           {:.1}", self.drug_percent)?;
        writeln!(f, "  Overall side effects (%): {:.1}", self.overall_adverse_percent)?;
        for a in &self.arms {
            writeln!(
                f,
                "  {:<8} n={:<5} adverse={:<5} ({:.1}%)  age {:.1} [{:.0}-{:.0}]",
                a.arm.label(),
                a.participants,
                a.with_adverse_effect,
                a.adverse_rate * 100.0,
                a.mean_age,
                a.min_age,
                a.max_age
            )?;
        }
        Ok(())
    }
}

/// Summarise the aggregated participant table.
///
/// Requires both arms to be non-empty.
pub fn profile_trial(table: &ParticipantTable) -> Result<TrialSummary> {
    let counts = table.require_both_arms()?;
    let total = counts.total();

    let arms: Vec<ArmSummary> = TreatmentArm::ALL
        .iter()
        .map(|&arm| summarise_arm(table, arm))
        .collect();

    let with_adverse: usize = arms.iter().map(|a| a.with_adverse_effect).sum();
    let rates = ArmRates {
        drug: arms[TreatmentArm::Drug.index()].adverse_rate,
        placebo: arms[TreatmentArm::Placebo.index()].adverse_rate,
    };

    Ok(TrialSummary {
        total_participants: total,
        drug_percent: 100.0 * counts.drug as f64 / total as f64,
        placebo_percent: 100.0 * counts.placebo as f64 / total as f64,
        overall_adverse_percent: 100.0 * with_adverse as f64 / total as f64,
        rates,
        arms,
    })
}

fn summarise_arm(table: &ParticipantTable, arm: TreatmentArm) -> ArmSummary {
    let members = table.arm(arm);
    let n = members.len();
    let with_adverse_effect = members.iter().filter(|p| p.had_adverse_effect).count();
    let ages: Vec<f64> = members.iter().map(|p| p.age).collect();

    let mean = |values: &[f64]| {
        if values.is_empty() {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };
    let effect_counts: Vec<f64> = members.iter().map(|p| p.effect_count as f64).collect();

    ArmSummary {
        arm,
        participants: n,
        with_adverse_effect,
        adverse_rate: if n > 0 {
            with_adverse_effect as f64 / n as f64
        } else {
            f64::NAN
        },
        mean_effect_count: mean(&effect_counts),
        mean_age: mean(&ages),
        min_age: ages.iter().copied().fold(f64::INFINITY, f64::min),
        max_age: ages.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}
