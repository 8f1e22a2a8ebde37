//! # tweetstats common
//!
//! Shared types, error taxonomy and logging bootstrap for the tweetstats
//! workspace.
//!
//! Every other crate in the workspace builds on the [`PostRecord`] and
//! [`Granularity`] types defined here and reports failures through
//! [`StatsError`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{Result, StatsError};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use types::*;
pub use utils::*;
