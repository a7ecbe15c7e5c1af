//! Synthetic trial data for demos and testing.
//!
//! Generates dose-level records with known per-arm event rates, so the
//! analysis can be checked against a ground truth.

pub mod generate;

pub use generate::{generate_trial, write_csv, SyntheticTrialConfig};
