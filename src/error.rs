//! Typed generation errors.
//!
//! Only configuration and I/O problems are errors. A candidate the solver
//! cannot place within its bound, a duplicate, or a full bin is an expected
//! outcome of sampling and is handled inside the sampler.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// Parameters rejected before any sampling work started.
    #[error("invalid parameter: {detail}")]
    InvalidParameter { detail: String },

    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Raised only under the `abort` stagnation policy.
    #[error("no instance accepted for {interval_secs}s ({accepted}/{target} written)")]
    Stagnated {
        interval_secs: u64,
        accepted: u64,
        target: u64,
    },
}

impl GenerateError {
    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidParameter {
            detail: detail.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>) -> impl FnOnce(serde_json::Error) -> Self {
        let path = path.into();
        move |source| Self::Json { path, source }
    }
}
