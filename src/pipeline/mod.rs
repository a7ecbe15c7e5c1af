//! Pipeline composition and execution for trial safety analysis.

pub mod config;
pub mod report;
mod runner;

pub use config::AnalysisConfig;
pub use report::{AgeView, Conclusion, OverviewView, SafetyReport, SideEffectView};
pub use runner::{run_safety_report, AnalysisPipeline, LoadedTrial};
