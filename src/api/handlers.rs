//! Request handlers for the five GET routes.

use super::AppState;
use crate::error::AnalyticsError;
use crate::store::{
    FeedbackPage, FeedbackStats, FeedbackTrends, ListFilter, ListQuery, SentimentByTopic,
    DEFAULT_TREND_DAYS,
};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Service identification returned from the root route.
#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub message: &'static str,
    pub version: &'static str,
}

/// `GET /`
pub async fn root() -> Json<ApiInfo> {
    Json(ApiInfo {
        message: "Feedback Analytics API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /api/feedback/stats`
pub async fn feedback_stats(
    State(state): State<AppState>,
) -> Result<Json<FeedbackStats>, AnalyticsError> {
    Ok(Json(state.store.stats().await?))
}

/// Query parameters for the listing route. All optional; absent filters
/// impose no constraint.
#[derive(Debug, Deserialize, Default)]
pub struct DataParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sentiment: Option<i32>,
    pub topic: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// `GET /api/feedback/data`
pub async fn feedback_data(
    State(state): State<AppState>,
    Query(params): Query<DataParams>,
) -> Result<Json<FeedbackPage>, AnalyticsError> {
    let filter = ListFilter {
        sentiment: params.sentiment,
        topic: params.topic,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let query = ListQuery::new(params.page, params.limit, filter)?;

    Ok(Json(state.store.list(&query).await?))
}

/// Query parameters for the trends route.
#[derive(Debug, Deserialize, Default)]
pub struct TrendParams {
    /// Window size in days, measured backward from now.
    pub days: Option<i32>,
}

/// `GET /api/feedback/trends`
pub async fn feedback_trends(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Result<Json<FeedbackTrends>, AnalyticsError> {
    let days = params.days.unwrap_or(DEFAULT_TREND_DAYS);

    Ok(Json(state.store.trends(days).await?))
}

/// `GET /api/feedback/sentiment-by-topic`
pub async fn sentiment_by_topic(
    State(state): State<AppState>,
) -> Result<Json<SentimentByTopic>, AnalyticsError> {
    Ok(Json(state.store.sentiment_by_topic().await?))
}
