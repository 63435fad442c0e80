//! HTTP API surface for the feedback analytics service.
//!
//! Builds the axum router, owns the shared application state, and maps
//! service errors onto client-facing responses.

pub mod handlers;

use crate::error::{AnalyticsError, Result};
use crate::store::FeedbackStore;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend shared by all requests.
    pub store: Arc<dyn FeedbackStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }
}

/// Client-facing error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for AnalyticsError {
    /// Rejected parameters are the caller's fault (400); everything else,
    /// including storage and mapping failures, surfaces as 500 carrying the
    /// underlying error text. Nothing is retried and no partial result is
    /// returned.
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            error!("{}: {}", self.category(), self);
        }

        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Builds the application router.
///
/// Cross-origin requests are permitted from any origin, method, and header.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/feedback/stats", get(handlers::feedback_stats))
        .route("/api/feedback/data", get(handlers::feedback_data))
        .route("/api/feedback/trends", get(handlers::feedback_trends))
        .route(
            "/api/feedback/sentiment-by-topic",
            get(handlers::sentiment_by_topic),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Binds the listener and serves requests until the task ends.
pub async fn serve(addr: &str, store: Arc<dyn FeedbackStore>) -> Result<()> {
    let app = router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AnalyticsError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("Feedback analytics API listening on http://{addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| AnalyticsError::internal(format!("Server error: {e}")))
}
