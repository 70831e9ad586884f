//! Error types for the analysis pipeline.

use thiserror::Error;

/// Failures that end an analysis and are reported as a top-level error
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Empty text provided")]
    EmptyInput,

    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("No valid text chunks found after processing")]
    NoChunks,

    #[error("No valid sentiment analysis results")]
    AllChunksFailed { failed: usize },
}

impl AnalysisError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Whether the failure came from the request rather than the analysis
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InvalidRequest { .. })
    }
}

/// A probability triple that cannot be scored
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("probability for {label} is not finite: {value}")]
    NonFinite { label: &'static str, value: f64 },

    #[error("probability for {label} is negative: {value}")]
    Negative { label: &'static str, value: f64 },

    #[error("probability for {label} is above 1: {value}")]
    OutOfRange { label: &'static str, value: f64 },
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
