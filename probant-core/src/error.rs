//! Error types for the probant crates.

use thiserror::Error;

/// Top-level error type for scan operations.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Resource error in {path}: {reason}")]
    Resource { path: String, reason: String },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Statistics error: {0}")]
    Statistics(String),

    #[error("Detector already registered: {id}")]
    DetectorAlreadyRegistered { id: String },

    #[error("Detector not found: {id}")]
    DetectorNotFound { id: String },
}

impl ScanError {
    pub fn resource(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resource {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }

    pub fn statistics(msg: impl Into<String>) -> Self {
        Self::Statistics(msg.into())
    }
}
