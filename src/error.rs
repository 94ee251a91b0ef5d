//! Error types for benchmark execution.
//!
//! Only faults that make a benchmark result meaningless are represented here.
//! Invalid run counts and oversized requests are clamped where they are read,
//! and a failed cleanup of a scratch file is logged and swallowed, so neither
//! ever reaches the caller as an error.

use thiserror::Error;

/// Fatal benchmark error. Any of these aborts the whole invocation before an
/// aggregate is produced.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A round-trip (decode of encode, decompress of compress) did not
    /// reproduce its input.
    #[error("{workload}: round-trip corruption: {detail}")]
    Corruption { workload: String, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl BenchError {
    pub fn corruption(workload: impl Into<String>, detail: impl Into<String>) -> Self {
        BenchError::Corruption {
            workload: workload.into(),
            detail: detail.into(),
        }
    }

    /// Whether this error signals an unsound measured subsystem rather than
    /// an environmental fault.
    pub fn is_corruption(&self) -> bool {
        matches!(self, BenchError::Corruption { .. })
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
