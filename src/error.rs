//! Error types for tripsight

use thiserror::Error;

/// Errors that can occur while building artifacts.
///
/// None of these abort a pipeline run: each aggregation degrades in
/// isolation, and malformed rows are dropped at ingest and counted.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("required column missing from input: {0}")]
    MissingColumn(String),

    #[error("invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("failed to parse raw trip record: {0}")]
    ParseError(String),
}
