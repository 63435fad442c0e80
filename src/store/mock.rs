//! In-memory feedback store for testing.
//!
//! Computes the same observable semantics as the Postgres store (filtering,
//! ordering, windowing, pivoting) over a vector of records, so the API
//! layer can be exercised without a database. Also backs the `--mock-db`
//! flag for local runs.

use crate::error::{AnalyticsError, Result};
use crate::store::{
    pivot_sentiment_by_topic, pivot_sentiment_trends, pivot_topic_trends,
    shape_sentiment_distribution, shape_topic_distribution, total_pages, FeedbackItem,
    FeedbackPage, FeedbackRecord, FeedbackStats, FeedbackStore, FeedbackTrends, ListQuery,
    SentimentByTopic, RECENT_WINDOW_DAYS,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use std::collections::BTreeMap;

/// A feedback store backed by an in-memory record list.
#[derive(Debug, Default)]
pub struct MockFeedbackStore {
    records: Vec<FeedbackRecord>,
}

impl MockFeedbackStore {
    /// Creates an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock store holding the given records.
    pub fn with_records(records: Vec<FeedbackRecord>) -> Self {
        Self { records }
    }

    /// Records matching the filter, newest first (unknown creation time
    /// sorts first, matching Postgres DESC null ordering).
    fn filtered_sorted(&self, query: &ListQuery) -> Result<Vec<FeedbackRecord>> {
        let start = query
            .filter
            .start_date
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;
        let end = query
            .filter
            .end_date
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        let mut matching: Vec<FeedbackRecord> = self
            .records
            .iter()
            .filter(|r| {
                query.filter.sentiment.map_or(true, |s| r.sentiment == s)
                    && query.filter.topic.map_or(true, |t| r.topic == t)
                    && start.map_or(true, |b| r.created_at.map_or(false, |c| c >= b))
                    && end.map_or(true, |b| r.created_at.map_or(false, |c| c <= b))
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| match (b.created_at, a.created_at) {
            (Some(x), Some(y)) => x.cmp(&y),
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, None) => std::cmp::Ordering::Equal,
        });

        Ok(matching)
    }
}

#[async_trait]
impl FeedbackStore for MockFeedbackStore {
    async fn stats(&self) -> Result<FeedbackStats> {
        let now = Utc::now();
        let recent_cutoff = now - Duration::days(RECENT_WINDOW_DAYS as i64);

        let total_feedback = self.records.len() as i64;
        let recent_feedback = self
            .records
            .iter()
            .filter(|r| r.created_at.map_or(false, |c| c >= recent_cutoff))
            .count() as i64;

        let mut by_sentiment: BTreeMap<i32, i64> = BTreeMap::new();
        let mut by_topic: BTreeMap<i32, i64> = BTreeMap::new();
        for record in &self.records {
            *by_sentiment.entry(record.sentiment).or_default() += 1;
            *by_topic.entry(record.topic).or_default() += 1;
        }

        let sentiment_rows: Vec<(i32, i64)> = by_sentiment.into_iter().collect();
        let topic_rows: Vec<(i32, i64)> = by_topic.into_iter().collect();

        Ok(FeedbackStats {
            total_feedback,
            recent_feedback,
            sentiment_distribution: shape_sentiment_distribution(&sentiment_rows)?,
            topic_distribution: shape_topic_distribution(&topic_rows)?,
        })
    }

    async fn list(&self, query: &ListQuery) -> Result<FeedbackPage> {
        let matching = self.filtered_sorted(query)?;
        let total = matching.len() as i64;

        let data = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .map(FeedbackItem::from_record)
            .collect::<Result<Vec<_>>>()?;

        Ok(FeedbackPage {
            data,
            total,
            page: query.page,
            limit: query.limit,
            total_pages: total_pages(total, query.limit),
        })
    }

    async fn trends(&self, days: i32) -> Result<FeedbackTrends> {
        let cutoff = Utc::now() - Duration::days(days as i64);

        let mut by_sentiment: BTreeMap<(String, i32), i64> = BTreeMap::new();
        let mut by_topic: BTreeMap<(String, i32), i64> = BTreeMap::new();

        for record in &self.records {
            let Some(created_at) = record.created_at else {
                continue;
            };
            if created_at < cutoff {
                continue;
            }
            let date = created_at.date_naive().to_string();
            *by_sentiment.entry((date.clone(), record.sentiment)).or_default() += 1;
            *by_topic.entry((date, record.topic)).or_default() += 1;
        }

        Ok(FeedbackTrends {
            sentiment_trends: pivot_sentiment_trends(&ordered_desc(by_sentiment))?,
            topic_trends: pivot_topic_trends(&ordered_desc(by_topic))?,
        })
    }

    async fn sentiment_by_topic(&self) -> Result<SentimentByTopic> {
        let mut counts: BTreeMap<(i32, i32), i64> = BTreeMap::new();
        for record in &self.records {
            *counts.entry((record.topic, record.sentiment)).or_default() += 1;
        }

        let rows: Vec<(i32, i32, i64)> = counts
            .into_iter()
            .map(|((topic, sentiment), count)| (topic, sentiment, count))
            .collect();

        Ok(SentimentByTopic {
            data: pivot_sentiment_by_topic(&rows)?,
        })
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Flattens grouped counts into rows ordered by date descending, code
/// ascending, matching the ORDER BY the Postgres store uses.
fn ordered_desc(counts: BTreeMap<(String, i32), i64>) -> Vec<(String, i32, i64)> {
    let mut rows: Vec<(String, i32, i64)> = counts
        .into_iter()
        .map(|((date, code), count)| (date, code, count))
        .collect();
    rows.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    rows
}

/// Parses a date-bound string the way Postgres casts text to timestamptz:
/// full timestamps and bare dates are accepted, anything else is a query
/// error.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc());
    }

    Err(AnalyticsError::query(format!(
        "invalid input syntax for type timestamp: \"{s}\""
    )))
}

/// A feedback store whose every operation fails, for error-path testing.
#[derive(Debug, Default)]
pub struct FailingFeedbackStore;

#[async_trait]
impl FeedbackStore for FailingFeedbackStore {
    async fn stats(&self) -> Result<FeedbackStats> {
        Err(AnalyticsError::connection("mock storage unavailable"))
    }

    async fn list(&self, _query: &ListQuery) -> Result<FeedbackPage> {
        Err(AnalyticsError::connection("mock storage unavailable"))
    }

    async fn trends(&self, _days: i32) -> Result<FeedbackTrends> {
        Err(AnalyticsError::connection("mock storage unavailable"))
    }

    async fn sentiment_by_topic(&self) -> Result<SentimentByTopic> {
        Err(AnalyticsError::connection("mock storage unavailable"))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
