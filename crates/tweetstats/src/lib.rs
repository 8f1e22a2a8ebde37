//! # tweetstats
//!
//! Command line front end: resolves configuration, loads an archive
//! directory, prints a per-period summary and writes the chart.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod cli;
pub mod error;
pub mod report;

pub use app::*;
pub use cli::*;
pub use error::*;
pub use report::*;
