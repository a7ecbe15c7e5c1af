//! Descriptive profiling of aggregated trial data.

pub mod events;
pub mod summary;

pub use events::{profile_events, EventIncidence};
pub use summary::{profile_trial, ArmRates, ArmSummary, TrialSummary};
