//! Per-participant aggregation of dose records.

use crate::data::arm::{AdverseEvent, TreatmentArm};
use crate::data::record::RawRecord;
use crate::error::{Result, SafetyError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One row per participant after collapsing their dose records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Participant identifier (unique within a table).
    pub id: String,
    /// Treatment arm (first value seen for this participant).
    pub arm: TreatmentArm,
    /// Age (first value seen for this participant).
    pub age: f64,
    /// Adverse-event flags, OR-reduced across all records.
    pub flags: [bool; AdverseEvent::COUNT],
    /// True when any adverse event was recorded.
    pub had_adverse_effect: bool,
    /// Number of distinct adverse-event types experienced (0-5).
    pub effect_count: usize,
}

impl ParticipantRecord {
    fn from_first(record: &RawRecord) -> Self {
        let mut participant = Self {
            id: record.id.clone(),
            arm: record.arm,
            age: record.age,
            flags: record.flags,
            had_adverse_effect: false,
            effect_count: 0,
        };
        participant.derive();
        participant
    }

    fn merge_flags(&mut self, record: &RawRecord) {
        for (acc, &flag) in self.flags.iter_mut().zip(record.flags.iter()) {
            *acc |= flag;
        }
        self.derive();
    }

    fn derive(&mut self) {
        self.effect_count = self.flags.iter().filter(|&&f| f).count();
        self.had_adverse_effect = self.effect_count > 0;
    }

    /// Whether the participant experienced the given event.
    pub fn has_event(&self, event: AdverseEvent) -> bool {
        self.flags[event.index()]
    }
}

/// How to treat participants whose records disagree on arm or age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyPolicy {
    /// Reject the dataset on any disagreement.
    #[default]
    Strict,
    /// Keep the first value seen and log a warning.
    FirstWins,
}

/// Participant counts for each arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmCounts {
    pub drug: usize,
    pub placebo: usize,
}

impl ArmCounts {
    /// Count for one arm.
    pub fn get(&self, arm: TreatmentArm) -> usize {
        match arm {
            TreatmentArm::Drug => self.drug,
            TreatmentArm::Placebo => self.placebo,
        }
    }

    /// Total across both arms.
    pub fn total(&self) -> usize {
        self.drug + self.placebo
    }
}

/// Immutable table of aggregated participants.
///
/// Built once from raw records and then only read. Participants keep the
/// order in which their id first appeared in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantTable {
    participants: Vec<ParticipantRecord>,
}

impl ParticipantTable {
    /// Number of participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Iterate over participants.
    pub fn iter(&self) -> impl Iterator<Item = &ParticipantRecord> {
        self.participants.iter()
    }

    /// All participants as a slice.
    pub fn participants(&self) -> &[ParticipantRecord] {
        &self.participants
    }

    /// Look up a participant by id.
    pub fn get(&self, id: &str) -> Option<&ParticipantRecord> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Participants in one arm.
    pub fn arm(&self, arm: TreatmentArm) -> Vec<&ParticipantRecord> {
        self.participants.iter().filter(|p| p.arm == arm).collect()
    }

    /// Ages of participants in one arm.
    pub fn ages(&self, arm: TreatmentArm) -> Vec<f64> {
        self.participants
            .iter()
            .filter(|p| p.arm == arm)
            .map(|p| p.age)
            .collect()
    }

    /// Participant counts per arm.
    pub fn arm_counts(&self) -> ArmCounts {
        let drug = self
            .participants
            .iter()
            .filter(|p| p.arm == TreatmentArm::Drug)
            .count();
        ArmCounts {
            drug,
            placebo: self.participants.len() - drug,
        }
    }

    /// Number of participants with any adverse effect, per arm.
    pub fn adverse_counts(&self) -> ArmCounts {
        let count = |arm: TreatmentArm| {
            self.participants
                .iter()
                .filter(|p| p.arm == arm && p.had_adverse_effect)
                .count()
        };
        ArmCounts {
            drug: count(TreatmentArm::Drug),
            placebo: count(TreatmentArm::Placebo),
        }
    }

    /// Fail with [`SafetyError::EmptyArm`] unless both arms have participants.
    pub fn require_both_arms(&self) -> Result<ArmCounts> {
        let counts = self.arm_counts();
        for arm in TreatmentArm::ALL {
            if counts.get(arm) == 0 {
                return Err(SafetyError::EmptyArm(arm.label().to_string()));
            }
        }
        Ok(counts)
    }

    /// Write the aggregated table as TSV.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let event_columns: Vec<&str> = AdverseEvent::ALL.iter().map(|e| e.column()).collect();
        writeln!(
            writer,
            "id\ttrx\tage\t{}\tadverse_effects\tnum_effects",
            event_columns.join("\t")
        )?;

        for p in &self.participants {
            let flags: Vec<&str> = p.flags.iter().map(|&f| if f { "1" } else { "0" }).collect();
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}",
                p.id,
                p.arm,
                p.age,
                flags.join("\t"),
                u8::from(p.had_adverse_effect),
                p.effect_count
            )?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Collapse dose records into one row per participant.
///
/// Arm and age come from the participant's first record. Adverse-event flags
/// are the logical OR over all of that participant's records. Under
/// [`ConsistencyPolicy::Strict`], any later record with a different arm or
/// age is an error.
pub fn aggregate_participants(
    records: &[RawRecord],
    policy: ConsistencyPolicy,
) -> Result<ParticipantTable> {
    if records.is_empty() {
        return Err(SafetyError::EmptyData("No records to aggregate".to_string()));
    }

    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut participants: Vec<ParticipantRecord> = Vec::new();

    for record in records {
        match positions.get(record.id.as_str()) {
            Some(&idx) => {
                let participant = &mut participants[idx];
                check_consistency(participant, record, policy)?;
                participant.merge_flags(record);
            }
            None => {
                positions.insert(record.id.as_str(), participants.len());
                participants.push(ParticipantRecord::from_first(record));
            }
        }
    }

    tracing::info!(
        records = records.len(),
        participants = participants.len(),
        "aggregated participants"
    );

    Ok(ParticipantTable { participants })
}

fn check_consistency(
    participant: &ParticipantRecord,
    record: &RawRecord,
    policy: ConsistencyPolicy,
) -> Result<()> {
    let conflict = if participant.arm != record.arm {
        Some(("trx", participant.arm.to_string(), record.arm.to_string()))
    } else if participant.age != record.age {
        Some(("age", participant.age.to_string(), record.age.to_string()))
    } else {
        None
    };

    let Some((field, first, other)) = conflict else {
        return Ok(());
    };

    match policy {
        ConsistencyPolicy::Strict => Err(SafetyError::InconsistentParticipant {
            id: participant.id.clone(),
            field: field.to_string(),
            first,
            other,
        }),
        ConsistencyPolicy::FirstWins => {
            tracing::warn!(
                id = %participant.id,
                field,
                kept = %first,
                ignored = %other,
                "participant records disagree, keeping first value"
            );
            Ok(())
        }
    }
}
