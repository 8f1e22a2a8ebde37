//! # tweetstats config
//!
//! Configuration schema, defaults, layered loading and validation.
//!
//! Values are resolved from built-in defaults, then an optional YAML file,
//! then `TWEETSTATS_*` environment variables. Command line flags are applied
//! on top by the binary before [`Config::validate`] runs.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use defaults::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
