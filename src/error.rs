//! Classifier Error Taxonomy
//!
//! Load-time errors (missing or corrupt model data) are fatal and surface to
//! the constructor caller. Per-query inference errors surface to the
//! `classify` caller. An empty corpus is not an error; it degrades to a
//! defined `clean` verdict in the k-NN layer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by model loading and classification
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// A required model file is absent
    #[error("model data missing: {path}")]
    ModelDataMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Model data failed validation (length mismatch, bad JSON, unknown label)
    #[error("model data corrupt: {0}")]
    ModelDataCorrupt(String),

    /// The embedding provider errored or returned the wrong dimensionality
    #[error("inference failure: {0}")]
    InferenceFailure(String),
}

impl ClassifierError {
    /// Wrap a file read so absence maps to ModelDataMissing
    pub fn read_file(path: &std::path::Path) -> Result<Vec<u8>, ClassifierError> {
        std::fs::read(path).map_err(|source| ClassifierError::ModelDataMissing {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Wrap a UTF-8 file read so absence maps to ModelDataMissing
    pub fn read_to_string(path: &std::path::Path) -> Result<String, ClassifierError> {
        std::fs::read_to_string(path).map_err(|source| ClassifierError::ModelDataMissing {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Convenience alias used throughout the crate
pub type Result<T, E = ClassifierError> = std::result::Result<T, E>;
