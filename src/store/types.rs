//! Record and response types for the feedback store.
//!
//! Also holds the pure result-shaping logic: distribution mapping,
//! pagination math, and the long-to-wide pivot folds used by the trends
//! and cross-tabulation operations. These are independent of any database
//! so they can be tested directly.

use crate::error::{AnalyticsError, Result};
use crate::labels::{Sentiment, Topic};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A classified feedback record as stored in the `prediction` table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRecord {
    pub id: i64,
    pub feedback: String,
    pub sentiment: i32,
    pub topic: i32,
    pub created_at: Option<DateTime<Utc>>,
}

/// One record in a listing response: human-readable labels alongside raw codes.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedbackItem {
    pub id: i64,
    pub feedback: String,
    pub sentiment: &'static str,
    pub sentiment_value: i32,
    pub topic: &'static str,
    pub topic_value: i32,
    pub created_at: Option<DateTime<Utc>>,
}

impl FeedbackItem {
    /// Shapes a stored record for the API, resolving codes to labels.
    ///
    /// A code outside the known set is a mapping error naming the code.
    pub fn from_record(record: FeedbackRecord) -> Result<Self> {
        let sentiment = Sentiment::try_from_code(record.sentiment)?;
        let topic = Topic::try_from_code(record.topic)?;

        Ok(Self {
            id: record.id,
            feedback: record.feedback,
            sentiment: sentiment.label(),
            sentiment_value: record.sentiment,
            topic: topic.label(),
            topic_value: record.topic,
            created_at: record.created_at,
        })
    }
}

/// Optional conjunctive filters for the listing operation.
///
/// Absent fields impose no constraint; present fields are ANDed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    /// Sentiment code to match exactly.
    pub sentiment: Option<i32>,
    /// Topic code to match exactly.
    pub topic: Option<i32>,
    /// Inclusive lower bound on `created_at`.
    pub start_date: Option<String>,
    /// Inclusive upper bound on `created_at`.
    pub end_date: Option<String>,
}

impl ListFilter {
    /// Returns true if no filter field is set.
    pub fn is_empty(&self) -> bool {
        self.sentiment.is_none()
            && self.topic.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// A validated listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: i64,
    pub limit: i64,
    pub filter: ListFilter,
}

/// Default page size for the listing operation.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

impl ListQuery {
    /// Builds a listing request from raw caller inputs.
    ///
    /// Policy: `page` below 1 (including 0 and negatives) is clamped to 1,
    /// so the offset is never negative. `limit` below 1 is rejected, which
    /// keeps the page-count division well defined. There is no upper bound
    /// on `limit`, but a page/limit pair whose row offset exceeds i64 is
    /// rejected rather than wrapping.
    pub fn new(page: Option<i64>, limit: Option<i64>, filter: ListFilter) -> Result<Self> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        if limit < 1 {
            return Err(AnalyticsError::invalid_param(format!(
                "limit must be at least 1, got {limit}"
            )));
        }

        if (page - 1).checked_mul(limit).is_none() {
            return Err(AnalyticsError::invalid_param(format!(
                "page {page} with limit {limit} is out of range"
            )));
        }

        Ok(Self {
            page,
            limit,
            filter,
        })
    }

    /// Number of rows to skip for this page. `new` guarantees this does
    /// not overflow; saturation covers hand-built queries.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Ceiling division of `total` by `limit`. Callers guarantee `limit >= 1`.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (total - 1) / limit + 1
}

/// One page of feedback records plus pagination metadata.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedbackPage {
    pub data: Vec<FeedbackItem>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// Count of records for one sentiment category.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentimentCount {
    pub sentiment: &'static str,
    pub count: i64,
}

/// Count of records for one topic category.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopicCount {
    pub topic: &'static str,
    pub count: i64,
}

/// Overall statistics of the feedback dataset.
///
/// Distributions list only categories with at least one record, in
/// ascending code order; zero-count categories are omitted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedbackStats {
    pub total_feedback: i64,
    pub recent_feedback: i64,
    pub sentiment_distribution: Vec<SentimentCount>,
    pub topic_distribution: Vec<TopicCount>,
}

/// Maps grouped `(sentiment code, count)` rows to labeled counts.
pub fn shape_sentiment_distribution(rows: &[(i32, i64)]) -> Result<Vec<SentimentCount>> {
    rows.iter()
        .map(|&(code, count)| {
            Ok(SentimentCount {
                sentiment: Sentiment::try_from_code(code)?.label(),
                count,
            })
        })
        .collect()
}

/// Maps grouped `(topic code, count)` rows to labeled counts.
pub fn shape_topic_distribution(rows: &[(i32, i64)]) -> Result<Vec<TopicCount>> {
    rows.iter()
        .map(|&(code, count)| {
            Ok(TopicCount {
                topic: Topic::try_from_code(code)?.label(),
                count,
            })
        })
        .collect()
}

/// Per-date sentiment counts in wide form for charting.
///
/// Sentiments with no records on a date are omitted from the JSON object.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct SentimentTrendPoint {
    pub date: String,
    #[serde(rename = "Negative", skip_serializing_if = "Option::is_none")]
    pub negative: Option<i64>,
    #[serde(rename = "Neutral", skip_serializing_if = "Option::is_none")]
    pub neutral: Option<i64>,
    #[serde(rename = "Positive", skip_serializing_if = "Option::is_none")]
    pub positive: Option<i64>,
}

impl SentimentTrendPoint {
    fn new(date: String) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }

    fn set(&mut self, sentiment: Sentiment, count: i64) {
        match sentiment {
            Sentiment::Negative => self.negative = Some(count),
            Sentiment::Neutral => self.neutral = Some(count),
            Sentiment::Positive => self.positive = Some(count),
        }
    }
}

/// Per-date topic counts in wide form for charting.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct TopicTrendPoint {
    pub date: String,
    #[serde(rename = "Lecturer", skip_serializing_if = "Option::is_none")]
    pub lecturer: Option<i64>,
    #[serde(rename = "Training Program", skip_serializing_if = "Option::is_none")]
    pub training_program: Option<i64>,
    #[serde(rename = "Facility", skip_serializing_if = "Option::is_none")]
    pub facility: Option<i64>,
    #[serde(rename = "Others", skip_serializing_if = "Option::is_none")]
    pub others: Option<i64>,
}

impl TopicTrendPoint {
    fn new(date: String) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }

    fn set(&mut self, topic: Topic, count: i64) {
        match topic {
            Topic::Lecturer => self.lecturer = Some(count),
            Topic::TrainingProgram => self.training_program = Some(count),
            Topic::Facility => self.facility = Some(count),
            Topic::Others => self.others = Some(count),
        }
    }
}

/// The two parallel trend series returned by the trends operation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedbackTrends {
    pub sentiment_trends: Vec<SentimentTrendPoint>,
    pub topic_trends: Vec<TopicTrendPoint>,
}

/// Folds `(date, sentiment code, count)` rows into wide per-date entries.
///
/// Rows must arrive ordered by date descending (the queries use an explicit
/// ORDER BY); the fold opens a new entry whenever the date changes, so the
/// output preserves that order. Rows for the same date land in one entry.
pub fn pivot_sentiment_trends(rows: &[(String, i32, i64)]) -> Result<Vec<SentimentTrendPoint>> {
    let mut points: Vec<SentimentTrendPoint> = Vec::new();

    for (date, code, count) in rows {
        let sentiment = Sentiment::try_from_code(*code)?;

        if points.last().map(|p| p.date.as_str()) != Some(date.as_str()) {
            points.push(SentimentTrendPoint::new(date.clone()));
        }
        let point = points.last_mut().expect("entry pushed for this date");
        point.set(sentiment, *count);
    }

    Ok(points)
}

/// Folds `(date, topic code, count)` rows into wide per-date entries.
pub fn pivot_topic_trends(rows: &[(String, i32, i64)]) -> Result<Vec<TopicTrendPoint>> {
    let mut points: Vec<TopicTrendPoint> = Vec::new();

    for (date, code, count) in rows {
        let topic = Topic::try_from_code(*code)?;

        if points.last().map(|p| p.date.as_str()) != Some(date.as_str()) {
            points.push(TopicTrendPoint::new(date.clone()));
        }
        let point = points.last_mut().expect("entry pushed for this date");
        point.set(topic, *count);
    }

    Ok(points)
}

/// Per-topic sentiment counts for the cross-tabulation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopicSentimentRow {
    pub topic: &'static str,
    #[serde(rename = "Negative", skip_serializing_if = "Option::is_none")]
    pub negative: Option<i64>,
    #[serde(rename = "Neutral", skip_serializing_if = "Option::is_none")]
    pub neutral: Option<i64>,
    #[serde(rename = "Positive", skip_serializing_if = "Option::is_none")]
    pub positive: Option<i64>,
}

impl TopicSentimentRow {
    fn new(topic: Topic) -> Self {
        Self {
            topic: topic.label(),
            negative: None,
            neutral: None,
            positive: None,
        }
    }

    fn set(&mut self, sentiment: Sentiment, count: i64) {
        match sentiment {
            Sentiment::Negative => self.negative = Some(count),
            Sentiment::Neutral => self.neutral = Some(count),
            Sentiment::Positive => self.positive = Some(count),
        }
    }
}

/// Sentiment distribution per topic.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentimentByTopic {
    pub data: Vec<TopicSentimentRow>,
}

/// Folds `(topic code, sentiment code, count)` rows into one entry per topic.
///
/// Rows must arrive ordered by topic, which the query guarantees; topics or
/// combinations with zero records simply do not appear.
pub fn pivot_sentiment_by_topic(rows: &[(i32, i32, i64)]) -> Result<Vec<TopicSentimentRow>> {
    let mut entries: Vec<TopicSentimentRow> = Vec::new();

    for (topic_code, sentiment_code, count) in rows {
        let topic = Topic::try_from_code(*topic_code)?;
        let sentiment = Sentiment::try_from_code(*sentiment_code)?;

        if entries.last().map(|e| e.topic) != Some(topic.label()) {
            entries.push(TopicSentimentRow::new(topic));
        }
        let entry = entries.last_mut().expect("entry pushed for this topic");
        entry.set(sentiment, *count);
    }

    Ok(entries)
}
