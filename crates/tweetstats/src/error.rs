//! Application-wide error types using thiserror.

use std::path::PathBuf;
use tweetstats_common::StatsError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Configuration could not be resolved or is invalid.
    #[error(transparent)]
    Config(#[from] StatsError),

    /// The chart or the JSON export could not be produced.
    #[error("Failed to write {path}: {source}")]
    Output {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: StatsError,
    },

    /// Console output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Wrap a rendering or export failure for `path`.
    pub fn output(path: impl Into<PathBuf>, source: StatsError) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }
}

/// Result type for the application.
pub type AppResult<T> = Result<T, AppError>;
