use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Cannot process file: {reason}")]
    Parse { reason: String },

    #[error("Schema mismatch: missing required column(s) {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("Invalid forecast payload: {0}")]
    Forecast(#[from] serde_json::Error),

    #[error("Failed to write CSV export: {0}")]
    Export(#[from] csv::Error),
}

pub type PulseResult<T> = Result<T, PulseError>;
