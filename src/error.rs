//! Error types

use thiserror::Error;

/// Failure to load a persisted page setup
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to parse page setup: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("page setup must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("invalid page size {width}x{height}")]
    InvalidPageSize { width: f32, height: f32 },
}
