//! Loading post records from a directory of archive files.
//!
//! Each accepted file holds one JSON array of post objects. Account exports
//! ship `.js` files that assign the array to a global
//! (`window.YTD.tweets.part0 = [...]`) and wrap every post as
//! `{"tweet": {...}}`; both are unwrapped here.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};
use tweetstats_common::{
    parse_created_at, CreatedAt, PostRecord, Result, StatsError, DEFAULT_ARCHIVE_EXTENSIONS,
};

/// Reads every archive file of one directory into post records.
#[derive(Debug, Clone)]
pub struct ArchiveLoader {
    directory: PathBuf,
    extensions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    created_at: String,
    #[serde(deserialize_with = "counter")]
    retweet_count: u64,
    #[serde(deserialize_with = "counter")]
    favorite_count: u64,
    #[serde(default)]
    full_text: Option<String>,
    #[serde(default)]
    text: Option<String>,
    lang: String,
    favorited: bool,
    retweeted: bool,
}

/// Counters arrive as integers, whole floats such as `5.0`, or decimal strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Counter {
    Number(u64),
    Float(f64),
    Text(String),
}

fn counter<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Counter::deserialize(deserializer)? {
        Counter::Number(n) => Ok(n),
        Counter::Float(f) => whole_count(f)
            .ok_or_else(|| de::Error::custom(format!("counter {f} is not a non-negative integer"))),
        Counter::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("counter '{s}' is not a non-negative integer"))),
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn whole_count(value: f64) -> Option<u64> {
    let whole = value.is_finite() && value >= 0.0 && value.fract() == 0.0;
    (whole && value < u64::MAX as f64).then_some(value as u64)
}

impl RawPost {
    fn into_record(self) -> PostRecord {
        let text = self
            .full_text
            .filter(|t| !t.is_empty())
            .or(self.text)
            .unwrap_or_default();

        PostRecord {
            created_at: CreatedAt(self.created_at),
            retweet_count: self.retweet_count,
            favorite_count: self.favorite_count,
            text,
            lang: self.lang,
            favorited: self.favorited,
            retweeted: self.retweeted,
        }
    }
}

impl ArchiveLoader {
    /// Create a loader for `directory` accepting the default extensions.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            extensions: DEFAULT_ARCHIVE_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
        }
    }

    /// Replace the accepted file extensions (without leading dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Accepted files in the directory, sorted by file name.
    pub fn archive_files(&self) -> Result<Vec<PathBuf>> {
        if !self.directory.is_dir() {
            return Err(StatsError::load_at(
                format!("{} is not a directory", self.directory.display()),
                &self.directory,
            ));
        }

        let entries = fs::read_dir(&self.directory).map_err(|e| {
            StatsError::load_with_source("Failed to list archive directory", &self.directory, e)
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| {
                    StatsError::load_with_source(
                        "Failed to list archive directory",
                        &self.directory,
                        e,
                    )
                })?
                .path();
            if path.is_file() && self.accepts(&path) {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Load every record in the directory.
    ///
    /// Records keep file order, then in-file order. Any unreadable file or
    /// invalid entry fails the whole load.
    #[instrument(skip(self), fields(directory = %self.directory.display()))]
    pub fn load(&self) -> Result<Vec<PostRecord>> {
        let files = self.archive_files()?;
        if files.is_empty() {
            info!("No archive files found in {}", self.directory.display());
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for path in &files {
            let mut batch = Self::load_file(path)?;
            debug!("Loaded {} records from {}", batch.len(), path.display());
            records.append(&mut batch);
        }

        info!("Loaded {} records from {} files", records.len(), files.len());
        Ok(records)
    }

    /// Best-effort [`load`](Self::load): errors are logged and yield no records.
    pub fn load_or_empty(&self) -> Vec<PostRecord> {
        self.load().unwrap_or_else(|err| {
            error!("Error loading tweets: {}", err);
            Vec::new()
        })
    }

    /// Parse one archive file.
    pub fn load_file(path: &Path) -> Result<Vec<PostRecord>> {
        let body = fs::read_to_string(path)
            .map_err(|e| StatsError::load_with_source("Failed to read archive file", path, e))?;
        Self::parse_archive(&body).map_err(|err| match err {
            StatsError::Load {
                message,
                path: None,
                source,
            } => StatsError::Load {
                message,
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    /// Parse the text of one archive file.
    pub fn parse_archive(body: &str) -> Result<Vec<PostRecord>> {
        let body = strip_assignment(body);
        let entries: Vec<Value> = serde_json::from_str(body).map_err(|e| StatsError::Load {
            message: "archive is not a JSON array".to_string(),
            path: None,
            source: Some(Box::new(e)),
        })?;

        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| parse_entry(index, entry))
            .collect()
    }
}

fn parse_entry(index: usize, entry: Value) -> Result<PostRecord> {
    let entry = match entry {
        Value::Object(mut map) if matches!(map.get("tweet"), Some(Value::Object(_))) => {
            map.remove("tweet").unwrap_or(Value::Null)
        }
        other => other,
    };

    let raw: RawPost = serde_json::from_value(entry).map_err(|e| StatsError::Load {
        message: format!("entry {index} is not a valid post"),
        path: None,
        source: Some(Box::new(e)),
    })?;

    if let Err(e) = parse_created_at(&raw.created_at) {
        return Err(StatsError::Load {
            message: format!("entry {index} has an unparseable created_at"),
            path: None,
            source: Some(Box::new(e)),
        });
    }

    Ok(raw.into_record())
}

/// Strip a leading `window.X = ` assignment and trailing semicolon.
fn strip_assignment(body: &str) -> &str {
    let trimmed = body.trim();
    if !trimmed.starts_with("window.") {
        return trimmed;
    }
    trimmed
        .split_once('=')
        .map_or(trimmed, |(_, rest)| rest.trim().trim_end_matches(';').trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let body = r#"[
            {"created_at": "2024-01-15T10:00:00Z", "retweet_count": 2, "favorite_count": 7,
             "favorited": true, "retweeted": false, "lang": "en", "full_text": "hello"}
        ]"#;

        let records = ArchiveLoader::parse_archive(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].retweet_count, 2);
        assert_eq!(records[0].favorite_count, 7);
        assert_eq!(records[0].text, "hello");
        assert_eq!(records[0].lang, "en");
        assert!(records[0].favorited);
    }

    #[test]
    fn test_parse_account_export() {
        let body = r#"window.YTD.tweets.part0 = [
            {"tweet": {"created_at": "Wed Oct 10 20:19:24 +0000 2018",
                       "retweet_count": "4", "favorite_count": "12",
                       "favorited": false, "retweeted": true,
                       "full_text": "exported", "lang": "en"}}
        ];"#;

        let records = ArchiveLoader::parse_archive(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].retweet_count, 4);
        assert_eq!(records[0].favorite_count, 12);
        assert!(records[0].retweeted);
        assert_eq!(
            records[0].created_at.as_str(),
            "Wed Oct 10 20:19:24 +0000 2018"
        );
    }

    #[test]
    fn test_text_fallback() {
        let body = r#"[
            {"created_at": "2024-01-01", "retweet_count": 0, "favorite_count": 0,
             "favorited": false, "retweeted": false, "lang": "en",
             "full_text": "", "text": "short"},
            {"created_at": "2024-01-01", "retweet_count": 0, "favorite_count": 0,
             "favorited": false, "retweeted": false, "lang": "und"}
        ]"#;

        let records = ArchiveLoader::parse_archive(body).unwrap();
        assert_eq!(records[0].text, "short");
        assert_eq!(records[1].text, "");
        assert_eq!(records[1].lang, "und");
    }

    #[test]
    fn test_missing_counter_fails() {
        let body = r#"[{"created_at": "2024-01-01T00:00:00Z", "retweet_count": 1,
                        "favorited": false, "retweeted": false, "lang": "en"}]"#;
        let err = ArchiveLoader::parse_archive(body).unwrap_err();
        assert!(err.is_load());
        assert!(err.to_string().contains("entry 0"));
    }

    #[test]
    fn test_missing_lang_fails() {
        let body = r#"[{"created_at": "2024-01-01T00:00:00Z", "retweet_count": 1,
                        "favorite_count": 2, "favorited": false, "retweeted": false}]"#;
        let err = ArchiveLoader::parse_archive(body).unwrap_err();
        assert!(err.is_load());
        assert!(err.to_string().contains("entry 0"));
    }

    #[test]
    fn test_missing_flags_fail() {
        let without_flags = r#"[{"created_at": "2024-01-01T00:00:00Z", "retweet_count": 1,
                                 "favorite_count": 2, "lang": "en"}]"#;
        assert!(ArchiveLoader::parse_archive(without_flags)
            .unwrap_err()
            .is_load());

        let without_retweeted = r#"[{"created_at": "2024-01-01T00:00:00Z", "retweet_count": 1,
                                     "favorite_count": 2, "lang": "en", "favorited": true}]"#;
        assert!(ArchiveLoader::parse_archive(without_retweeted)
            .unwrap_err()
            .is_load());
    }

    #[test]
    fn test_negative_counter_fails() {
        let body = r#"[{"created_at": "2024-01-01T00:00:00Z", "retweet_count": "-3",
                        "favorite_count": 0, "favorited": false, "retweeted": false,
                        "lang": "en"}]"#;
        assert!(ArchiveLoader::parse_archive(body).unwrap_err().is_load());
    }

    #[test]
    fn test_whole_float_counters() {
        let body = r#"[{"created_at": "2024-01-01T00:00:00Z", "retweet_count": 5.0,
                        "favorite_count": 12, "favorited": false, "retweeted": false,
                        "lang": "en"}]"#;
        let records = ArchiveLoader::parse_archive(body).unwrap();
        assert_eq!(records[0].retweet_count, 5);
        assert_eq!(records[0].favorite_count, 12);

        for bad in ["5.5", "-1.0", "1e300"] {
            let body = format!(
                r#"[{{"created_at": "2024-01-01T00:00:00Z", "retweet_count": {bad},
                     "favorite_count": 0, "favorited": false, "retweeted": false,
                     "lang": "en"}}]"#
            );
            let err = ArchiveLoader::parse_archive(&body).unwrap_err();
            assert!(err.is_load(), "{bad}");
        }
    }

    #[test]
    fn test_bad_timestamp_fails_whole_file() {
        let body = r#"[
            {"created_at": "2024-01-01T00:00:00Z", "retweet_count": 0, "favorite_count": 0,
             "favorited": false, "retweeted": false, "lang": "en"},
            {"created_at": "yesterday", "retweet_count": 0, "favorite_count": 0,
             "favorited": false, "retweeted": false, "lang": "en"}
        ]"#;

        let err = ArchiveLoader::parse_archive(body).unwrap_err();
        assert!(err.is_load());
        assert!(err.to_string().contains("entry 1"));
    }

    #[test]
    fn test_not_an_array() {
        let err = ArchiveLoader::parse_archive(r#"{"created_at": "2024-01-01"}"#).unwrap_err();
        assert!(err.is_load());
    }

    #[test]
    fn test_strip_assignment() {
        assert_eq!(strip_assignment("  [1, 2]\n"), "[1, 2]");
        assert_eq!(
            strip_assignment("window.YTD.tweets.part0 = [1];\n"),
            "[1]"
        );
    }

    #[test]
    fn test_missing_directory() {
        let loader = ArchiveLoader::new("/definitely/not/here");
        let err = loader.load().unwrap_err();
        match err {
            StatsError::Load { path, .. } => {
                assert_eq!(path, Some(PathBuf::from("/definitely/not/here")));
            }
            other => panic!("expected load error, got {other:?}"),
        }
        assert!(loader.load_or_empty().is_empty());
    }

    #[test]
    fn test_extension_matching() {
        let loader = ArchiveLoader::new(".").with_extensions(["json"]);
        assert!(loader.accepts(Path::new("a.json")));
        assert!(loader.accepts(Path::new("a.JSON")));
        assert!(!loader.accepts(Path::new("a.js")));
        assert!(!loader.accepts(Path::new("README")));
    }

    #[test]
    fn test_default_extensions() {
        let loader = ArchiveLoader::new(".");
        assert!(loader.accepts(Path::new("tweets.js")));
        assert!(loader.accepts(Path::new("tweets.json")));
        assert!(!loader.accepts(Path::new("tweets.csv")));
    }
}
