//! # tweetstats graphs
//!
//! Archive loading, period aggregation and chart composition.
//!
//! The pipeline is linear: [`ArchiveLoader`] produces post records,
//! [`PeriodSummary`] buckets them into per-period tables and
//! [`ChartComposer`] lays the tables out as three bar panels that a
//! [`ChartRenderer`] turns into an SVG document.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod archive_loader;
pub mod composer;
pub mod export;
pub mod renderer;
pub mod types;

pub use aggregator::*;
pub use archive_loader::*;
pub use composer::*;
pub use export::*;
pub use renderer::*;
pub use types::*;
