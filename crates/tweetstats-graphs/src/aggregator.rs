//! Period aggregation of post records into per-period tables

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, instrument};
use tweetstats_common::{Granularity, PostRecord, Result, StatsError};

use crate::{AggregateTable, Metric, TableRow};

/// Bucket records by the start of the period containing their `created_at`.
///
/// Keys come out in ascending order. A single unparseable timestamp fails the
/// whole grouping.
pub fn group_by_period(
    records: &[PostRecord],
    granularity: Granularity,
) -> Result<BTreeMap<DateTime<Utc>, Vec<&PostRecord>>> {
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<&PostRecord>> = BTreeMap::new();

    for record in records {
        let start = granularity.period_start(record.timestamp()?)?;
        buckets.entry(start).or_default().push(record);
    }

    Ok(buckets)
}

/// Trait for reducing post records into an aggregate table
pub trait DataAggregator {
    /// Group `records` by `granularity` and reduce every non-empty period.
    fn aggregate(
        &self,
        records: &[PostRecord],
        granularity: Granularity,
    ) -> Result<AggregateTable>;
}

/// Aggregator backed by [`group_by_period`] and a [`Metric`] reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodAggregator {
    /// Reduction applied to every period.
    pub metric: Metric,
}

impl PeriodAggregator {
    /// Create an aggregator for `metric`.
    pub const fn new(metric: Metric) -> Self {
        Self { metric }
    }
}

impl DataAggregator for PeriodAggregator {
    #[instrument(skip(self, records), fields(metric = %self.metric, records = records.len()))]
    fn aggregate(
        &self,
        records: &[PostRecord],
        granularity: Granularity,
    ) -> Result<AggregateTable> {
        let rows: Vec<TableRow> = group_by_period(records, granularity)?
            .into_iter()
            .map(|(period_start, bucket)| TableRow {
                period_start,
                value: self.metric.reduce(&bucket),
            })
            .collect();

        debug!("Aggregated {} '{}' rows", rows.len(), self.metric);
        Ok(AggregateTable {
            metric: self.metric,
            rows,
        })
    }
}

/// Number of records per period.
pub fn try_count_per_period(
    records: &[PostRecord],
    granularity: Granularity,
) -> Result<AggregateTable> {
    PeriodAggregator::new(Metric::PostCount).aggregate(records, granularity)
}

/// Mean `favorite_count` per period.
pub fn try_mean_favorites_per_period(
    records: &[PostRecord],
    granularity: Granularity,
) -> Result<AggregateTable> {
    PeriodAggregator::new(Metric::MeanFavorites).aggregate(records, granularity)
}

/// Mean `retweet_count` per period.
pub fn try_mean_retweets_per_period(
    records: &[PostRecord],
    granularity: Granularity,
) -> Result<AggregateTable> {
    PeriodAggregator::new(Metric::MeanRetweets).aggregate(records, granularity)
}

fn or_empty(metric: Metric, result: Result<AggregateTable>) -> AggregateTable {
    result.unwrap_or_else(|err| {
        error!("Failed to compute '{}' per period: {}", metric, err);
        AggregateTable::empty(metric)
    })
}

/// Best-effort [`try_count_per_period`]: failures are logged and yield an empty table.
pub fn count_per_period(records: &[PostRecord], granularity: Granularity) -> AggregateTable {
    or_empty(
        Metric::PostCount,
        try_count_per_period(records, granularity),
    )
}

/// Best-effort [`try_mean_favorites_per_period`].
pub fn mean_favorites_per_period(
    records: &[PostRecord],
    granularity: Granularity,
) -> AggregateTable {
    or_empty(
        Metric::MeanFavorites,
        try_mean_favorites_per_period(records, granularity),
    )
}

/// Best-effort [`try_mean_retweets_per_period`].
pub fn mean_retweets_per_period(
    records: &[PostRecord],
    granularity: Granularity,
) -> AggregateTable {
    or_empty(
        Metric::MeanRetweets,
        try_mean_retweets_per_period(records, granularity),
    )
}

/// The three per-period tables of one run, each kept with its own outcome.
///
/// A failing metric does not prevent the others from being computed.
#[derive(Debug)]
pub struct PeriodSummary {
    /// Granularity the tables were computed with.
    pub granularity: Granularity,
    /// Posts per period.
    pub count: Result<AggregateTable>,
    /// Mean favorites per period.
    pub mean_favorites: Result<AggregateTable>,
    /// Mean retweets per period.
    pub mean_retweets: Result<AggregateTable>,
}

/// Degraded view of a [`PeriodSummary`], failed tables replaced by empty ones.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTables {
    /// Posts per period.
    pub count: AggregateTable,
    /// Mean favorites per period.
    pub mean_favorites: AggregateTable,
    /// Mean retweets per period.
    pub mean_retweets: AggregateTable,
}

impl PeriodSummary {
    /// Run all three aggregations over `records`.
    #[instrument(skip(records), fields(records = records.len()))]
    pub fn compute(records: &[PostRecord], granularity: Granularity) -> Self {
        Self {
            granularity,
            count: try_count_per_period(records, granularity),
            mean_favorites: try_mean_favorites_per_period(records, granularity),
            mean_retweets: try_mean_retweets_per_period(records, granularity),
        }
    }

    fn outcomes(&self) -> [(Metric, &Result<AggregateTable>); 3] {
        [
            (Metric::PostCount, &self.count),
            (Metric::MeanFavorites, &self.mean_favorites),
            (Metric::MeanRetweets, &self.mean_retweets),
        ]
    }

    /// Metrics whose aggregation failed, with the reason.
    pub fn failures(&self) -> Vec<(Metric, &StatsError)> {
        self.outcomes()
            .into_iter()
            .filter_map(|(metric, outcome)| outcome.as_ref().err().map(|err| (metric, err)))
            .collect()
    }

    /// Whether every metric was computed.
    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }

    /// Tables to display, with failed metrics degraded to empty tables.
    pub fn tables(&self) -> SummaryTables {
        let pick = |metric: Metric, outcome: &Result<AggregateTable>| {
            outcome
                .as_ref()
                .map_or_else(|_| AggregateTable::empty(metric), Clone::clone)
        };

        SummaryTables {
            count: pick(Metric::PostCount, &self.count),
            mean_favorites: pick(Metric::MeanFavorites, &self.mean_favorites),
            mean_retweets: pick(Metric::MeanRetweets, &self.mean_retweets),
        }
    }

    /// Union of the period starts of every successful table, ascending.
    pub fn periods(&self) -> Vec<DateTime<Utc>> {
        let periods: BTreeSet<DateTime<Utc>> = self
            .outcomes()
            .into_iter()
            .filter_map(|(_, outcome)| outcome.as_ref().ok())
            .flat_map(AggregateTable::period_starts)
            .collect();
        periods.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tweetstats_common::test_utils::{assert_approx_eq, mock_timestamp, record};

    fn sample() -> Vec<PostRecord> {
        vec![
            record("2024-01-15T10:00:00Z", 3, 1),
            record("2024-01-20T08:30:00Z", 5, 2),
            record("2024-02-01T00:00:00Z", 10, 6),
        ]
    }

    #[test]
    fn test_group_by_period_keys_are_sorted() {
        let records = vec![
            record("2024-03-01T00:00:00Z", 0, 0),
            record("2024-01-05T00:00:00Z", 0, 0),
            record("2024-01-31T23:59:59Z", 0, 0),
        ];

        let buckets = group_by_period(&records, Granularity::Month).unwrap();
        let keys: Vec<_> = buckets.keys().copied().collect();

        assert_eq!(
            keys,
            vec![
                mock_timestamp(2024, 1, 1, 0, 0, 0),
                mock_timestamp(2024, 3, 1, 0, 0, 0),
            ]
        );
        assert_eq!(buckets[&mock_timestamp(2024, 1, 1, 0, 0, 0)].len(), 2);
    }

    #[test]
    fn test_month_boundary_example() {
        let records = sample();

        let counts = count_per_period(&records, Granularity::Month);
        assert_eq!(counts.len(), 2);
        assert_eq!(
            counts.value_at(mock_timestamp(2024, 1, 1, 0, 0, 0)),
            Some(2.0)
        );
        assert_eq!(
            counts.value_at(mock_timestamp(2024, 2, 1, 0, 0, 0)),
            Some(1.0)
        );

        let favorites = mean_favorites_per_period(&records, Granularity::Month);
        assert_approx_eq(favorites.rows[0].value, 4.0, 1e-12);
        assert_approx_eq(favorites.rows[1].value, 10.0, 1e-12);

        let retweets = mean_retweets_per_period(&records, Granularity::Month);
        assert_approx_eq(retweets.rows[0].value, 1.5, 1e-12);
        assert_approx_eq(retweets.rows[1].value, 6.0, 1e-12);
    }

    #[test]
    fn test_count_of_four_in_one_period() {
        let records = vec![
            record("2024-03-01T00:00:00Z", 0, 0),
            record("2024-03-09T12:00:00Z", 0, 0),
            record("2024-03-17T06:30:00Z", 0, 0),
            record("2024-03-31T23:59:59Z", 0, 0),
        ];

        let counts = count_per_period(&records, Granularity::Month);
        assert_eq!(counts.len(), 1);
        assert_eq!(
            counts.rows[0].period_start,
            mock_timestamp(2024, 3, 1, 0, 0, 0)
        );
        assert_eq!(counts.rows[0].value, 4.0);
    }

    #[test]
    fn test_posts_in_adjacent_months() {
        let records = vec![
            record("2024-01-15T10:00:00Z", 0, 0),
            record("2024-02-02T09:00:00Z", 0, 0),
        ];

        let counts = count_per_period(&records, Granularity::Month);
        let rows: Vec<_> = counts
            .iter()
            .map(|row| (row.period_start, row.value))
            .collect();
        assert_eq!(
            rows,
            vec![
                (mock_timestamp(2024, 1, 1, 0, 0, 0), 1.0),
                (mock_timestamp(2024, 2, 1, 0, 0, 0), 1.0),
            ]
        );
    }

    #[test]
    fn test_mean_is_not_truncated() {
        let records = vec![
            record("2024-05-01T00:00:00Z", 3, 0),
            record("2024-05-02T00:00:00Z", 5, 0),
            record("2024-05-03T00:00:00Z", 10, 0),
        ];

        let favorites = mean_favorites_per_period(&records, Granularity::Month);
        assert_eq!(favorites.rows.len(), 1);
        assert_approx_eq(favorites.rows[0].value, 6.0, 1e-12);

        let pair = vec![
            record("2024-05-01T00:00:00Z", 1, 0),
            record("2024-05-02T00:00:00Z", 2, 0),
        ];
        let favorites = mean_favorites_per_period(&pair, Granularity::Month);
        assert_approx_eq(favorites.rows[0].value, 1.5, 1e-12);
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        for granularity in Granularity::ALL {
            assert!(try_count_per_period(&[], granularity).unwrap().is_empty());
            assert!(try_mean_favorites_per_period(&[], granularity)
                .unwrap()
                .is_empty());
            assert!(try_mean_retweets_per_period(&[], granularity)
                .unwrap()
                .is_empty());
        }
    }

    #[test]
    fn test_no_zero_fill_between_periods() {
        let records = vec![
            record("2024-01-10T00:00:00Z", 1, 1),
            record("2024-04-10T00:00:00Z", 1, 1),
        ];

        let counts = count_per_period(&records, Granularity::Month);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.value_at(mock_timestamp(2024, 2, 1, 0, 0, 0)), None);
    }

    #[test]
    fn test_malformed_timestamp_degrades_to_empty() {
        let mut records = sample();
        records.push(record("not a date", 1, 1));

        assert!(count_per_period(&records, Granularity::Month).is_empty());
        assert!(mean_favorites_per_period(&records, Granularity::Month).is_empty());
        assert!(mean_retweets_per_period(&records, Granularity::Month).is_empty());

        let err = try_count_per_period(&records, Granularity::Month).unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_week_starts_monday() {
        // 2024-01-07 is a Sunday, 2024-01-08 a Monday
        let records = vec![
            record("2024-01-07T23:00:00Z", 0, 0),
            record("2024-01-08T01:00:00Z", 0, 0),
        ];

        let counts = count_per_period(&records, Granularity::Week);
        let starts: Vec<_> = counts.period_starts().collect();
        assert_eq!(
            starts,
            vec![
                mock_timestamp(2024, 1, 1, 0, 0, 0),
                mock_timestamp(2024, 1, 8, 0, 0, 0),
            ]
        );
    }

    #[test]
    fn test_summary_keeps_outcomes_apart() {
        let summary = PeriodSummary::compute(&sample(), Granularity::Month);
        assert!(summary.is_complete());
        assert_eq!(
            summary.periods(),
            vec![
                mock_timestamp(2024, 1, 1, 0, 0, 0),
                mock_timestamp(2024, 2, 1, 0, 0, 0),
            ]
        );

        let tables = summary.tables();
        assert_eq!(tables.count.metric, Metric::PostCount);
        assert_eq!(tables.mean_favorites.metric, Metric::MeanFavorites);
        assert_eq!(tables.mean_retweets.metric, Metric::MeanRetweets);
    }

    #[test]
    fn test_summary_reports_failures() {
        let records = vec![record("garbage", 1, 1)];
        let summary = PeriodSummary::compute(&records, Granularity::Day);

        let failed: Vec<_> = summary
            .failures()
            .into_iter()
            .map(|(metric, _)| metric)
            .collect();
        assert_eq!(failed, Metric::ALL.to_vec());
        assert!(summary.periods().is_empty());

        let tables = summary.tables();
        assert!(tables.count.is_empty());
        assert!(tables.mean_favorites.is_empty());
        assert!(tables.mean_retweets.is_empty());
    }

    #[test]
    fn test_empty_summary_is_complete() {
        let summary = PeriodSummary::compute(&[], Granularity::Month);
        assert!(summary.is_complete());
        assert!(summary.periods().is_empty());
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let records = sample();
        let aggregator = PeriodAggregator::new(Metric::MeanRetweets);

        let first = aggregator.aggregate(&records, Granularity::Week).unwrap();
        let second = aggregator.aggregate(&records, Granularity::Week).unwrap();
        assert_eq!(first, second);
    }
}
