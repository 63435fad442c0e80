//! Storage abstraction for the feedback analytics service.
//!
//! Provides a trait-based interface over the `prediction` table, allowing
//! the Postgres-backed store and the in-memory mock to be used
//! interchangeably by the API layer.

mod mock;
mod postgres;
mod types;

pub use mock::{FailingFeedbackStore, MockFeedbackStore};
pub use postgres::PostgresStore;
pub use types::{
    pivot_sentiment_by_topic, pivot_sentiment_trends, pivot_topic_trends,
    shape_sentiment_distribution, shape_topic_distribution, total_pages, FeedbackItem,
    FeedbackPage, FeedbackRecord, FeedbackStats, FeedbackTrends, ListFilter, ListQuery,
    SentimentByTopic, SentimentCount, SentimentTrendPoint, TopicCount, TopicSentimentRow,
    TopicTrendPoint, DEFAULT_PAGE_LIMIT,
};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Default window for the trends operation, in days.
pub const DEFAULT_TREND_DAYS: i32 = 30;

/// Window for the "recent feedback" statistic, in days.
pub const RECENT_WINDOW_DAYS: i32 = 7;

/// Creates a Postgres-backed store for the given configuration.
///
/// This is the central factory function for storage access; the pool it
/// opens is shared by all requests for the life of the process.
pub async fn connect(config: &ConnectionConfig) -> Result<Arc<dyn FeedbackStore>> {
    let store = PostgresStore::connect(config).await?;
    Ok(Arc::new(store))
}

/// Trait defining the read operations over the feedback dataset.
///
/// All operations are async, side-effect free, and return Results with
/// AnalyticsError. Every call is independently computed from current
/// storage contents; no state is held between requests.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Overall statistics: totals, trailing-7-day count, and per-category
    /// distributions (zero-count categories omitted).
    async fn stats(&self) -> Result<FeedbackStats>;

    /// One page of records matching the query's filters, newest first,
    /// with the total matching count and page-count metadata.
    async fn list(&self, query: &ListQuery) -> Result<FeedbackPage>;

    /// Daily sentiment and topic counts over the trailing `days` window,
    /// pivoted into wide per-date entries ordered by date descending.
    async fn trends(&self, days: i32) -> Result<FeedbackTrends>;

    /// Sentiment counts cross-tabulated by topic, one entry per topic in
    /// ascending code order.
    async fn sentiment_by_topic(&self) -> Result<SentimentByTopic>;

    /// Releases storage resources (drains the pool for the Postgres store).
    async fn close(&self) -> Result<()>;
}
