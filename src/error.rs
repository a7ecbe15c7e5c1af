//! Error types for the trial-safety library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{0}' in safety data")]
    MissingColumn(String),

    #[error("Invalid value '{value}' at row {row}, column '{column}'")]
    InvalidValue {
        value: String,
        row: usize,
        column: String,
    },

    #[error("Unknown treatment arm '{value}' at row {row} (expected Drug or Placebo)")]
    UnknownArm { value: String, row: usize },

    #[error("Participant '{id}' has conflicting {field}: '{first}' vs '{other}'")]
    InconsistentParticipant {
        id: String,
        field: String,
        first: String,
        other: String,
    },

    #[error("Treatment arm '{0}' has no participants")]
    EmptyArm(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, SafetyError>;
