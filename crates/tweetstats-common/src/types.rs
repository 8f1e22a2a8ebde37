//! Domain types shared across the workspace: post records and period granularity.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{utils::parse_created_at, Result, StatsError};

/// Creation timestamp of a post, kept exactly as the archive spelled it.
///
/// Parsing is deferred to [`CreatedAt::parse`] so that a record carrying an
/// uninterpretable timestamp can still be represented and reported by the
/// stage that needs the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatedAt(pub String);

impl CreatedAt {
    /// Parse into a UTC timestamp.
    pub fn parse(&self) -> Result<DateTime<Utc>> {
        parse_created_at(&self.0)
    }

    /// The raw text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CreatedAt {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CreatedAt {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<DateTime<Utc>> for CreatedAt {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.to_rfc3339())
    }
}

impl fmt::Display for CreatedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File extensions, without the leading dot, that hold archive data by default.
pub const DEFAULT_ARCHIVE_EXTENSIONS: [&str; 2] = ["json", "js"];

/// One normalized post with its engagement counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// When the post was created.
    pub created_at: CreatedAt,
    /// Number of reposts.
    pub retweet_count: u64,
    /// Number of likes.
    pub favorite_count: u64,
    /// Post body.
    pub text: String,
    /// Language code, e.g. `en`.
    pub lang: String,
    /// Whether the archive owner liked the post.
    pub favorited: bool,
    /// Whether the archive owner reposted the post.
    pub retweeted: bool,
}

impl PostRecord {
    /// Create a record with the fields aggregation cares about; the rest are
    /// left empty.
    pub fn new(created_at: impl Into<CreatedAt>, retweet_count: u64, favorite_count: u64) -> Self {
        Self {
            created_at: created_at.into(),
            retweet_count,
            favorite_count,
            text: String::new(),
            lang: String::new(),
            favorited: false,
            retweeted: false,
        }
    }

    /// Parsed creation timestamp.
    pub fn timestamp(&self) -> Result<DateTime<Utc>> {
        self.created_at.parse()
    }
}

/// Calendar-aligned period unit used to bucket records.
///
/// All boundaries are computed in UTC. Weeks start on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Granularity {
    /// Calendar hours.
    Hour,
    /// Calendar days.
    Day,
    /// Weeks starting on Monday.
    Week,
    /// Calendar months.
    #[default]
    Month,
    /// Quarters starting in January, April, July and October.
    Quarter,
    /// Calendar years.
    Year,
}

impl Granularity {
    /// Every supported granularity, finest first.
    pub const ALL: [Self; 6] = [
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Quarter,
        Self::Year,
    ];

    /// Start of the period containing `ts`.
    pub fn period_start(self, ts: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let date = ts.date_naive();
        let start = match self {
            Self::Hour => date.and_hms_opt(ts.hour(), 0, 0),
            Self::Day => date.and_hms_opt(0, 0, 0),
            Self::Week => {
                let back = i64::from(date.weekday().num_days_from_monday());
                date.checked_sub_signed(Duration::days(back))
                    .and_then(|monday| monday.and_hms_opt(0, 0, 0))
            }
            Self::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            Self::Quarter => {
                let month = (date.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), month, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            }
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        };

        start.map(|naive| naive.and_utc()).ok_or_else(|| {
            StatsError::malformed_field(
                format!("timestamp {ts} has no representable {self} start"),
                "created_at",
            )
        })
    }

    /// Start of the period following the one starting at `start`.
    pub fn next_period_start(self, start: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let next = match self {
            Self::Hour => start.checked_add_signed(Duration::hours(1)),
            Self::Day => start.checked_add_signed(Duration::days(1)),
            Self::Week => start.checked_add_signed(Duration::weeks(1)),
            Self::Month => start.checked_add_months(Months::new(1)),
            Self::Quarter => start.checked_add_months(Months::new(3)),
            Self::Year => start.checked_add_months(Months::new(12)),
        };
        next.ok_or_else(|| StatsError::malformed(format!("no {self} period follows {start}")))
    }

    /// Lower-case name, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// `strftime` pattern suited to labelling periods of this size.
    pub const fn label_format(self) -> &'static str {
        match self {
            Self::Hour => "%Y-%m-%d %H:00",
            Self::Day | Self::Week => "%Y-%m-%d",
            Self::Month | Self::Quarter => "%b %Y",
            Self::Year => "%Y",
        }
    }
}

impl FromStr for Granularity {
    type Err = StatsError;

    /// Accepts the unit names plus the pandas-style aliases found in older
    /// notebooks (`M`, `MS`, `W`, `D`, `H`, `Q`, `A`).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" | "hourly" | "h" => Ok(Self::Hour),
            "day" | "daily" | "d" => Ok(Self::Day),
            "week" | "weekly" | "w" => Ok(Self::Week),
            "month" | "monthly" | "m" | "ms" => Ok(Self::Month),
            "quarter" | "quarterly" | "q" | "qs" => Ok(Self::Quarter),
            "year" | "yearly" | "y" | "a" | "ys" | "as" => Ok(Self::Year),
            other => Err(StatsError::config(format!("Unknown granularity '{other}'"))),
        }
    }
}

impl TryFrom<String> for Granularity {
    type Error = StatsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Granularity> for String {
    fn from(value: Granularity) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
