//! Multiple testing correction.

pub mod bh;

pub use bh::{compare_events, correct_bh, BhCorrected, EventComparison};
