//! Analysis configuration, loadable from YAML.

use crate::chart::DEFAULT_HISTOGRAM_BINS;
use crate::data::ConsistencyPolicy;
use crate::error::{Result, SafetyError};
use crate::test::DEFAULT_ALPHA;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for one safety analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Name of the analysis.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Path to the delimited safety data file.
    pub data: Option<PathBuf>,
    /// Field delimiter of the data file.
    pub delimiter: char,
    /// Significance level for all classifications.
    pub alpha: f64,
    /// Number of bins per age histogram.
    pub histogram_bins: usize,
    /// Apply Yates' correction to chi-square tests with one degree of freedom.
    pub yates_correction: bool,
    /// Handling of participants whose records disagree on arm or age.
    pub consistency: ConsistencyPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            name: "drug-safety".to_string(),
            description: None,
            data: None,
            delimiter: ',',
            alpha: DEFAULT_ALPHA,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            yates_correction: true,
            consistency: ConsistencyPolicy::Strict,
        }
    }
}

impl AnalysisConfig {
    /// Create a config for a data file with default settings.
    pub fn for_data<P: AsRef<Path>>(path: P) -> Self {
        Self {
            data: Some(path.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(SafetyError::from)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(SafetyError::InvalidParameter(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if self.histogram_bins == 0 {
            return Err(SafetyError::InvalidParameter(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        if !self.delimiter.is_ascii() {
            return Err(SafetyError::InvalidParameter(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// Set the significance level.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the histogram bin count.
    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    /// Set the consistency policy.
    pub fn with_consistency(mut self, policy: ConsistencyPolicy) -> Self {
        self.consistency = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.histogram_bins, 20);
        assert!(config.yates_correction);
        assert_eq!(config.consistency, ConsistencyPolicy::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AnalysisConfig::for_data("safety_data.csv")
            .with_alpha(0.01)
            .with_histogram_bins(15)
            .with_consistency(ConsistencyPolicy::FirstWins);

        let yaml = config.to_yaml().unwrap();
        let parsed = AnalysisConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = AnalysisConfig::from_yaml("name: short\nalpha: 0.1\n").unwrap();

        assert_eq!(config.name, "short");
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.histogram_bins, 20);
        assert_eq!(config.delimiter, ',');
    }

    #[test]
    fn test_policy_names() {
        let config = AnalysisConfig::from_yaml("consistency: first_wins\n").unwrap();
        assert_eq!(config.consistency, ConsistencyPolicy::FirstWins);
    }

    #[test]
    fn test_invalid_alpha() {
        assert!(AnalysisConfig::from_yaml("alpha: 1.5\n").is_err());
        assert!(AnalysisConfig::default().with_alpha(0.0).validate().is_err());
    }

    #[test]
    fn test_invalid_bins() {
        assert!(AnalysisConfig::default().with_histogram_bins(0).validate().is_err());
    }
}
