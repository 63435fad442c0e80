//! PostgreSQL-backed feedback store.
//!
//! Implements the `FeedbackStore` trait over the `prediction` table using
//! a bounded sqlx connection pool shared across requests. Filter clauses
//! are composed with bound placeholders only; no caller-supplied value is
//! ever concatenated into SQL text.

use crate::config::ConnectionConfig;
use crate::error::{AnalyticsError, Result};
use crate::store::{
    pivot_sentiment_by_topic, pivot_sentiment_trends, pivot_topic_trends,
    shape_sentiment_distribution, shape_topic_distribution, total_pages, FeedbackItem,
    FeedbackPage, FeedbackRecord, FeedbackStats, FeedbackStore, FeedbackTrends, ListFilter,
    ListQuery, SentimentByTopic, RECENT_WINDOW_DAYS,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum pooled connections.
const POOL_MAX_CONNECTIONS: u32 = 5;

/// Timeout for acquiring a pooled connection.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Maximum number of connection retry attempts at startup.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// PostgreSQL feedback store.
#[derive(Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Opens the connection pool for the configured database.
    ///
    /// Transient failures (refused, timed out) are retried with exponential
    /// backoff; permanent ones (bad credentials, missing database) fail
    /// immediately with an actionable message.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;

        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Connection attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            let result = PgPoolOptions::new()
                .max_connections(POOL_MAX_CONNECTIONS)
                .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
                .connect(&conn_str)
                .await;

            match result {
                Ok(pool) => {
                    debug!("Connected to {}", config.display_string());
                    return Ok(Self { pool });
                }
                Err(e) => {
                    let is_transient = is_transient_error(&e);
                    last_error = Some(e);

                    if attempt < MAX_RETRY_ATTEMPTS && is_transient {
                        warn!(
                            "Connection attempt {} failed (transient error), retrying in {:?}",
                            attempt, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        // All retries exhausted
        Err(map_connection_error(
            last_error.expect("at least one attempt was made"),
            config,
        ))
    }

    /// Creates a store from an existing pool. Primarily useful for testing.
    #[allow(dead_code)]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs a grouped count over the trailing `days` window for one
    /// category column, ordered for the pivot fold.
    async fn fetch_daily_counts(&self, column: &str, days: i32) -> Result<Vec<(String, i32, i64)>> {
        // `column` is one of two compile-time constants, never caller input.
        let sql = format!(
            "SELECT created_at::date::text, {column}::int4, COUNT(*)::int8 \
             FROM prediction \
             WHERE created_at >= NOW() - ($1::int4 * INTERVAL '1 day') \
             GROUP BY 1, 2 \
             ORDER BY 1 DESC, 2 ASC"
        );

        sqlx::query_as(&sql)
            .bind(days)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AnalyticsError::query(format_query_error(e)))
    }
}

#[async_trait]
impl FeedbackStore for PostgresStore {
    async fn stats(&self) -> Result<FeedbackStats> {
        let total_feedback: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prediction")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AnalyticsError::query(format_query_error(e)))?;

        let recent_feedback: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM prediction \
             WHERE created_at >= NOW() - ($1::int4 * INTERVAL '1 day')",
        )
        .bind(RECENT_WINDOW_DAYS)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AnalyticsError::query(format_query_error(e)))?;

        let sentiment_rows: Vec<(i32, i64)> = sqlx::query_as(
            "SELECT sentiment::int4, COUNT(*)::int8 FROM prediction \
             GROUP BY sentiment ORDER BY sentiment",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AnalyticsError::query(format_query_error(e)))?;

        let topic_rows: Vec<(i32, i64)> = sqlx::query_as(
            "SELECT topic::int4, COUNT(*)::int8 FROM prediction \
             GROUP BY topic ORDER BY topic",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AnalyticsError::query(format_query_error(e)))?;

        Ok(FeedbackStats {
            total_feedback,
            recent_feedback,
            sentiment_distribution: shape_sentiment_distribution(&sentiment_rows)?,
            topic_distribution: shape_topic_distribution(&topic_rows)?,
        })
    }

    async fn list(&self, query: &ListQuery) -> Result<FeedbackPage> {
        // Total matching count, unaffected by pagination
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM prediction");
        apply_filters(&mut count_builder, &query.filter);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AnalyticsError::query(format_query_error(e)))?;

        // One page, newest first
        let mut page_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id::int8, feedback, sentiment::int4, topic::int4, \
             created_at::timestamptz FROM prediction",
        );
        apply_filters(&mut page_builder, &query.filter);
        page_builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let rows: Vec<(i64, String, i32, i32, Option<DateTime<Utc>>)> = page_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AnalyticsError::query(format_query_error(e)))?;

        let data = rows
            .into_iter()
            .map(|(id, feedback, sentiment, topic, created_at)| {
                FeedbackItem::from_record(FeedbackRecord {
                    id,
                    feedback,
                    sentiment,
                    topic,
                    created_at,
                })
            })
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
        let sentiment_rows = self.fetch_daily_counts("sentiment", days).await?;
        let topic_rows = self.fetch_daily_counts("topic", days).await?;

        Ok(FeedbackTrends {
            sentiment_trends: pivot_sentiment_trends(&sentiment_rows)?,
            topic_trends: pivot_topic_trends(&topic_rows)?,
        })
    }

    async fn sentiment_by_topic(&self) -> Result<SentimentByTopic> {
        let rows: Vec<(i32, i32, i64)> = sqlx::query_as(
            "SELECT topic::int4, sentiment::int4, COUNT(*)::int8 FROM prediction \
             GROUP BY topic, sentiment ORDER BY topic ASC, sentiment ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AnalyticsError::query(format_query_error(e)))?;

        Ok(SentimentByTopic {
            data: pivot_sentiment_by_topic(&rows)?,
        })
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Appends the WHERE clause for whichever filters are present.
///
/// Each predicate binds its own placeholder; date bounds are bound as text
/// and cast to timestamptz server-side.
fn apply_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a ListFilter) {
    if filter.is_empty() {
        return;
    }

    builder.push(" WHERE ");
    let mut cond = builder.separated(" AND ");

    if let Some(sentiment) = filter.sentiment {
        cond.push("sentiment = ").push_bind_unseparated(sentiment);
    }
    if let Some(topic) = filter.topic {
        cond.push("topic = ").push_bind_unseparated(topic);
    }
    if let Some(start) = filter.start_date.as_deref() {
        cond.push("created_at >= ")
            .push_bind_unseparated(start)
            .push_unseparated("::timestamptz");
    }
    if let Some(end) = filter.end_date.as_deref() {
        cond.push("created_at <= ")
            .push_bind_unseparated(end)
            .push_unseparated("::timestamptz");
    }
}

/// Determines if a connection error is transient and worth retrying.
fn is_transient_error(error: &sqlx::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("timeout")
        || error_str.contains("temporarily unavailable")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
}

/// Maps sqlx connection errors to actionable messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> AnalyticsError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        AnalyticsError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("authentication failed") {
        AnalyticsError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        AnalyticsError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        AnalyticsError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        AnalyticsError::connection(error.to_string())
    }
}

/// Formats a query error, including Postgres detail and hint when present.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = format!("ERROR: {}", db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }
        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
