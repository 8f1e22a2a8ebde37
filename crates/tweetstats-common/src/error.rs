//! Error types and utilities for tweetstats

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tweetstats operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Main error type for tweetstats operations
#[derive(Error, Debug)]
pub enum StatsError {
    /// The post archive could not be loaded
    #[error("Load error: {message}")]
    Load {
        /// What went wrong
        message: String,
        /// File or directory being read, when known
        path: Option<PathBuf>,
        /// Underlying I/O or parse error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A field required for aggregation could not be interpreted
    #[error("Malformed input: {message}")]
    MalformedInput {
        /// What went wrong
        message: String,
        /// Name of the offending record field
        field: Option<String>,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
        /// Underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Chart composition and rendering errors
    #[error("Graph error: {message}")]
    Graph {
        /// What went wrong
        message: String,
        /// Underlying drawing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StatsError {
    /// Create a new load error pointing at the offending file or directory
    pub fn load_at(msg: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Load {
            message: msg.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    /// Create a new load error with path and source
    pub fn load_with_source(
        msg: impl Into<String>,
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Load {
            message: msg.into(),
            path: Some(path.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new malformed input error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new malformed input error naming the offending field
    pub fn malformed_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error with source
    pub fn graph_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error belongs to the load stage
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Load { .. })
    }

    /// Whether this error was caused by uninterpretable record fields
    pub const fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to StatsError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for StatsError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::graph_with_source("Graph rendering failed", err)
    }
}
