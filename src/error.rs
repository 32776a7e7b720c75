use thiserror::Error;

use crate::validation::RunReport;

/// The main error type for framecheck operations.
#[derive(Debug, Error)]
pub enum FramecheckError {
    #[error("Failed to serialize report as JSON: {0}")]
    ReportJson(#[from] serde_json::Error),

    #[error("No inputs to validate (directories matched no files)")]
    NoInputs,

    #[error("Validation failed: {failed_inputs} of {total_inputs} input(s) with errors")]
    ValidationFailed {
        failed_inputs: usize,
        total_inputs: usize,
        report: Box<RunReport>,
    },

    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),
}
