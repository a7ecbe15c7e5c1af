//! Data structures for trial safety analysis.

mod arm;
mod contingency;
mod participant;
mod record;

pub use arm::{AdverseEvent, TreatmentArm};
pub use contingency::{ContingencyTable, EFFECT_COUNT_LEVELS};
pub use participant::{
    aggregate_participants, ArmCounts, ConsistencyPolicy, ParticipantRecord, ParticipantTable,
};
pub use record::{
    load_raw_records, load_raw_records_with, read_raw_records, write_raw_records, RawRecord,
    ReadOptions, AGE_COLUMN, ARM_COLUMN, ID_COLUMN,
};
