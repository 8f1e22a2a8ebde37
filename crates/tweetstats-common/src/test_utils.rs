//! Test utilities and shared fixtures for the tweetstats workspace.
//!
//! Enabled for this crate's own tests and, through the `testing` feature, for
//! the integration tests of downstream crates.

use chrono::{DateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::sync::Once;

use crate::PostRecord;

static INIT: Once = Once::new();

/// Initialize logging for tests once per test binary.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(filter)
            .try_init();
    });
}

/// Test fixture for creating a UTC timestamp.
pub fn mock_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// A record created at `created_at` (any accepted layout) with the given counters.
pub fn record(created_at: &str, favorites: u64, retweets: u64) -> PostRecord {
    PostRecord::new(created_at, retweets, favorites)
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Archive fixtures written to disk.
pub mod archive_fixtures {
    use super::*;

    /// One post object in the classic API layout.
    pub fn post_json(
        created_at: &str,
        favorites: u64,
        retweets: u64,
        text: &str,
    ) -> serde_json::Value {
        serde_json::json!({
            "created_at": created_at,
            "retweet_count": retweets,
            "favorite_count": favorites,
            "favorited": false,
            "retweeted": false,
            "lang": "en",
            "full_text": text,
        })
    }

    /// Write `posts` as a JSON array to `dir/name` and return the file path.
    pub fn write_archive(dir: &Path, name: &str, posts: &[serde_json::Value]) -> PathBuf {
        let path = dir.join(name);
        let body = serde_json::to_string_pretty(posts).expect("fixture serializes");
        std::fs::write(&path, body).expect("fixture written");
        path
    }

    /// Write raw text to `dir/name` and return the file path.
    pub fn write_raw(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).expect("fixture written");
        path
    }

    /// Create a temporary directory for tests that automatically cleans up.
    #[cfg(feature = "tempfile")]
    pub fn create_temp_dir() -> tempfile::TempDir {
        tempfile::tempdir().expect("Failed to create temporary directory")
    }
}
