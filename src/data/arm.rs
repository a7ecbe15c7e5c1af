//! Treatment arms and adverse-event categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The treatment group a participant was assigned to.
///
/// Trials handled by this crate have exactly two arms. A third label in the
/// input is rejected at load time rather than silently grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TreatmentArm {
    /// Active drug arm.
    Drug,
    /// Placebo control arm.
    Placebo,
}

impl TreatmentArm {
    /// Both arms in display order (Drug first).
    pub const ALL: [TreatmentArm; 2] = [TreatmentArm::Drug, TreatmentArm::Placebo];

    /// Label as it appears in the `trx` column.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Drug => "Drug",
            Self::Placebo => "Placebo",
        }
    }

    /// Row index used by per-arm arrays and tables.
    pub fn index(&self) -> usize {
        match self {
            Self::Drug => 0,
            Self::Placebo => 1,
        }
    }
}

impl fmt::Display for TreatmentArm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TreatmentArm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "Drug" => Ok(Self::Drug),
            "Placebo" => Ok(Self::Placebo),
            other => Err(other.to_string()),
        }
    }
}

/// One adverse-event category recorded as a binary flag per dose record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdverseEvent {
    Headache,
    AbdominalPain,
    Dyspepsia,
    UpperRespiratoryInfection,
    Coad,
}

impl AdverseEvent {
    /// All events in input column order.
    pub const ALL: [AdverseEvent; 5] = [
        AdverseEvent::Headache,
        AdverseEvent::AbdominalPain,
        AdverseEvent::Dyspepsia,
        AdverseEvent::UpperRespiratoryInfection,
        AdverseEvent::Coad,
    ];

    /// Number of tracked events.
    pub const COUNT: usize = 5;

    /// Column name in the input file.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Headache => "headache",
            Self::AbdominalPain => "ab.pain",
            Self::Dyspepsia => "dyspepsia",
            Self::UpperRespiratoryInfection => "upper.resp.infect",
            Self::Coad => "coad",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Headache => "Headache",
            Self::AbdominalPain => "Abdominal pain",
            Self::Dyspepsia => "Dyspepsia",
            Self::UpperRespiratoryInfection => "Upper respiratory infection",
            Self::Coad => "COAD",
        }
    }

    /// Position in the flag array.
    pub fn index(&self) -> usize {
        match self {
            Self::Headache => 0,
            Self::AbdominalPain => 1,
            Self::Dyspepsia => 2,
            Self::UpperRespiratoryInfection => 3,
            Self::Coad => 4,
        }
    }
}

impl fmt::Display for AdverseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
