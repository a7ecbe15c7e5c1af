//! Trial Safety Analysis Library
//!
//! This library aggregates dose-level adverse-event records from a two-arm
//! (Drug vs Placebo) clinical trial into one row per participant and compares
//! the arms.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (RawRecord, ParticipantTable, ContingencyTable)
//! - **profile**: Descriptive statistics (arm sizes, adverse-effect rates, ages)
//! - **test**: Hypothesis testing (z-test, chi-square, Shapiro-Wilk, Mann-Whitney)
//! - **correct**: Multiple testing correction (Benjamini-Hochberg)
//! - **chart**: Chart-ready series (bar series, histograms)
//! - **pipeline**: One-time loading and report generation
//! - **simulate**: Synthetic trial data with known event rates
//!
//! # Example
//!
//! ```no_run
//! use trial_safety::prelude::*;
//!
//! // Load and aggregate once
//! let config = AnalysisConfig::for_data("safety_data.csv").with_alpha(0.05);
//! let trial = LoadedTrial::load(&config).unwrap();
//!
//! // Compute every view
//! let report = AnalysisPipeline::new(config).run(&trial.participants).unwrap();
//! println!("{}", report);
//! ```

pub mod chart;
pub mod correct;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod profile;
pub mod simulate;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::chart::{render_bars, render_histogram, AgeHistograms, BarSeries, Histogram};
    pub use crate::correct::{compare_events, correct_bh, BhCorrected, EventComparison};
    pub use crate::data::{
        aggregate_participants, load_raw_records, AdverseEvent, ConsistencyPolicy,
        ContingencyTable, ParticipantRecord, ParticipantTable, RawRecord, TreatmentArm,
    };
    pub use crate::error::{Result, SafetyError};
    pub use crate::pipeline::{
        run_safety_report, AgeView, AnalysisConfig, AnalysisPipeline, Conclusion, LoadedTrial,
        OverviewView, SafetyReport, SideEffectView,
    };
    pub use crate::profile::{profile_events, profile_trial, EventIncidence, TrialSummary};
    pub use crate::simulate::{generate_trial, write_csv, SyntheticTrialConfig};
    pub use crate::test::{
        test_chi2_independence, test_mann_whitney, test_proportions_z, test_shapiro,
        ChiSquareResult, MannWhitneyResult, NormalityResult, ProportionTestResult, Significance,
    };
}
