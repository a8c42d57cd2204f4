use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for levelcat
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Manifest '{}' not found", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("Engine '{0}' not found")]
    EngineNotFound(String),

    #[error("Failed to start '{command}': {source}")]
    CommandStart {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Measurement of '{}' timed out after {seconds}s", .path.display())]
    MeasurementTimeout { path: PathBuf, seconds: u64 },

    #[error("No loudness block found in measurement output for '{}'", .path.display())]
    MeasurementParseFailure { path: PathBuf },

    #[error("Measurement of '{}' is missing field '{field}'", .path.display())]
    MeasurementFieldMissing { path: PathBuf, field: String },

    #[error("Normalization of '{}' timed out after {seconds}s", .path.display())]
    NormalizationTimeout { path: PathBuf, seconds: u64 },

    #[error("Normalization of '{}' failed: {reason}", .path.display())]
    NormalizationFailure { path: PathBuf, reason: String },

    #[error("Concatenation timed out after {seconds}s")]
    ConcatenationTimeout { seconds: u64 },

    #[error("Concatenation failed: {reason}")]
    ConcatenationFailure { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for levelcat operations
pub type CoreResult<T> = std::result::Result<T, PipelineError>;
