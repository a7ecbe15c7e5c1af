//! Pipeline runner: one-time load, then per-view computation.

use crate::chart::{AgeHistograms, BarSeries};
use crate::correct::compare_events;
use crate::data::{
    aggregate_participants, load_raw_records_with, ConsistencyPolicy, ContingencyTable,
    ParticipantTable, RawRecord, ReadOptions, TreatmentArm,
};
use crate::error::{Result, SafetyError};
use crate::pipeline::config::AnalysisConfig;
use crate::pipeline::report::{AgeView, Conclusion, OverviewView, SafetyReport, SideEffectView};
use crate::profile::{profile_events, profile_trial};
use crate::test::{
    test_chi2_independence, test_mann_whitney, test_proportions_z, test_shapiro, Significance,
};
use std::path::{Path, PathBuf};

/// Aggregated trial data, loaded once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct LoadedTrial {
    /// File the data came from, if any.
    pub source: Option<PathBuf>,
    /// Number of raw dose records read.
    pub n_records: usize,
    /// Aggregated participants.
    pub participants: ParticipantTable,
}

impl LoadedTrial {
    /// Read and aggregate the data file named in the config.
    pub fn load(config: &AnalysisConfig) -> Result<Self> {
        let path = config.data.as_ref().ok_or_else(|| {
            SafetyError::InvalidParameter("No data file configured".to_string())
        })?;
        Self::from_file(path, config)
    }

    /// Read and aggregate a specific file using the config's read settings.
    pub fn from_file<P: AsRef<Path>>(path: P, config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let delimiter = u8::try_from(config.delimiter).map_err(|_| {
            SafetyError::InvalidParameter(format!(
                "delimiter must be a single ASCII character, got '{}'",
                config.delimiter
            ))
        })?;
        let options = ReadOptions { delimiter };
        let records = load_raw_records_with(path.as_ref(), options)?;
        let mut trial = Self::from_records(&records, config.consistency)?;
        trial.source = Some(path.as_ref().to_path_buf());
        Ok(trial)
    }

    /// Aggregate records already in memory.
    pub fn from_records(records: &[RawRecord], policy: ConsistencyPolicy) -> Result<Self> {
        Ok(Self {
            source: None,
            n_records: records.len(),
            participants: aggregate_participants(records, policy)?,
        })
    }
}

/// Computes the overview, side-effect and age views from a participant table.
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    config: AnalysisConfig,
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl AnalysisPipeline {
    /// Create a pipeline with the given settings.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every view and derive the conclusion.
    ///
    /// Fails with [`SafetyError::EmptyArm`] before any statistic is computed
    /// if either arm has no participants.
    pub fn run(&self, table: &ParticipantTable) -> Result<SafetyReport> {
        self.config.validate()?;
        let counts = table.require_both_arms()?;
        tracing::info!(
            drug = counts.drug,
            placebo = counts.placebo,
            "running safety analysis '{}'",
            self.config.name
        );

        let overview = self.overview(table).map_err(|e| step_error("overview", e))?;
        let side_effects = self
            .side_effects(table)
            .map_err(|e| step_error("side effects", e))?;
        let age = self.age(table).map_err(|e| step_error("age", e))?;
        let conclusion = Conclusion::from_views(&side_effects, &age);

        Ok(SafetyReport {
            name: self.config.name.clone(),
            alpha: self.config.alpha,
            overview,
            side_effects,
            age,
            conclusion,
        })
    }

    /// Overview statistics.
    pub fn overview(&self, table: &ParticipantTable) -> Result<OverviewView> {
        Ok(OverviewView {
            summary: profile_trial(table)?,
        })
    }

    /// Proportion test, chi-square test and per-event comparisons.
    pub fn side_effects(&self, table: &ParticipantTable) -> Result<SideEffectView> {
        let arm_counts = table.require_both_arms()?;
        let adverse = table.adverse_counts();
        let alpha = self.config.alpha;

        let proportion = test_proportions_z(
            [adverse.drug as u64, adverse.placebo as u64],
            [arm_counts.drug as u64, arm_counts.placebo as u64],
        )?;
        let proportion_significance = Significance::classify(proportion.p_value, alpha);

        let summary = profile_trial(table)?;
        let rates = BarSeries::adverse_rates(&summary.rates);

        let contingency = ContingencyTable::from_participants(table);
        let chi_square = test_chi2_independence(&contingency, self.config.yates_correction)?;
        let association = Significance::classify(chi_square.p_value, alpha);

        let events = compare_events(&profile_events(table))?;

        Ok(SideEffectView {
            proportion,
            proportion_significance,
            rates,
            chi_square,
            association,
            contingency,
            events,
        })
    }

    /// Normality per arm, Mann-Whitney comparison and age histograms.
    pub fn age(&self, table: &ParticipantTable) -> Result<AgeView> {
        table.require_both_arms()?;
        let drug = table.ages(TreatmentArm::Drug);
        let placebo = table.ages(TreatmentArm::Placebo);

        let shapiro_drug = test_shapiro(&drug)?;
        let shapiro_placebo = test_shapiro(&placebo)?;
        let mann_whitney = test_mann_whitney(&drug, &placebo)?;
        let age_difference = Significance::classify(mann_whitney.p_value, self.config.alpha);
        let histograms = AgeHistograms::from_table(table, self.config.histogram_bins)?;

        Ok(AgeView {
            shapiro_drug,
            shapiro_placebo,
            mann_whitney,
            age_difference,
            histograms,
        })
    }
}

fn step_error(step: &str, err: SafetyError) -> SafetyError {
    match err {
        SafetyError::EmptyArm(_) => err,
        other => SafetyError::Pipeline(format!("{} view failed: {}", step, other)),
    }
}

/// Load a data file and produce the full report with default settings.
pub fn run_safety_report<P: AsRef<Path>>(path: P) -> Result<SafetyReport> {
    let config = AnalysisConfig::for_data(path);
    let trial = LoadedTrial::load(&config)?;
    AnalysisPipeline::new(config).run(&trial.participants)
}
