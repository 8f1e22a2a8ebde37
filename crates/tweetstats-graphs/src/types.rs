//! Aggregate table types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tweetstats_common::PostRecord;

/// The per-period statistic an aggregate table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Number of posts in the period.
    PostCount,
    /// Mean `favorite_count` over the period's posts.
    MeanFavorites,
    /// Mean `retweet_count` over the period's posts.
    MeanRetweets,
}

impl Metric {
    /// All metrics in table order.
    pub const ALL: [Self; 3] = [Self::PostCount, Self::MeanFavorites, Self::MeanRetweets];

    /// Column label of the value column.
    pub const fn column(self) -> &'static str {
        match self {
            Self::PostCount => "count",
            Self::MeanFavorites => "favorite avg",
            Self::MeanRetweets => "retweet avg",
        }
    }

    /// Reduce the posts of one non-empty period to this metric's value.
    ///
    /// Callers never pass an empty bucket; the mean of an empty period is
    /// undefined and such periods are not emitted.
    pub fn reduce(self, bucket: &[&PostRecord]) -> f64 {
        let field: fn(&PostRecord) -> u64 = match self {
            Self::PostCount => return bucket.len() as f64,
            Self::MeanFavorites => |post| post.favorite_count,
            Self::MeanRetweets => |post| post.retweet_count,
        };
        let total: u64 = bucket.iter().map(|post| field(post)).sum();
        total as f64 / bucket.len() as f64
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One row of an aggregate table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Start of the period this row describes.
    pub period_start: DateTime<Utc>,
    /// The metric value for the period.
    pub value: f64,
}

/// Ordered `(period_start, value)` rows produced by one reduction.
///
/// Rows are sorted by ascending period start, one per non-empty period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateTable {
    /// Which reduction produced the values.
    pub metric: Metric,
    /// The rows.
    pub rows: Vec<TableRow>,
}

impl AggregateTable {
    /// A table with no rows.
    pub const fn empty(metric: Metric) -> Self {
        Self {
            metric,
            rows: Vec::new(),
        }
    }

    /// Label of the value column.
    pub const fn column(&self) -> &'static str {
        self.metric.column()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the rows in period order.
    pub fn iter(&self) -> std::slice::Iter<'_, TableRow> {
        self.rows.iter()
    }

    /// Value for the period starting at `period_start`, if present.
    pub fn value_at(&self, period_start: DateTime<Utc>) -> Option<f64> {
        self.rows
            .binary_search_by_key(&period_start, |row| row.period_start)
            .ok()
            .map(|idx| self.rows[idx].value)
    }

    /// Period starts, in order.
    pub fn period_starts(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.rows.iter().map(|row| row.period_start)
    }

    /// Largest value in the table.
    pub fn max_value(&self) -> Option<f64> {
        self.rows.iter().map(|row| row.value).reduce(f64::max)
    }
}

impl<'a> IntoIterator for &'a AggregateTable {
    type Item = &'a TableRow;
    type IntoIter = std::slice::Iter<'a, TableRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
