//! Error type for the closure engine and its loaders

use std::path::PathBuf;

use cfpq_core::CoreError;

/// Errors surfaced by [`compute_closure`](crate::compute_closure) and the loaders
///
/// Any error aborts the whole query; no partially filled response is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Whether this is a grammar or graph configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Core(err) if err.is_configuration())
    }
}

/// Result type for closure operations
pub type Result<T> = std::result::Result<T, Error>;
