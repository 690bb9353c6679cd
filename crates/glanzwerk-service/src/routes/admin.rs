use axum::{
    Json,
    Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::AppState;
use crate::errors::ApiError;
use crate::scheduler::SchedulerService;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TriggerResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_id: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    success: bool,
    is_running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_generation: Option<DateTime<Utc>>,
    stats: StatsResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    total_generated: i64,
    total_published: i64,
    today_generated: i64,
    unused_topics: i64,
}

/// Runs one guarded generation cycle. The outcome is always a JSON
/// envelope, a failed pipeline never becomes a panic or opaque 500.
#[instrument(skip(state))]
async fn trigger_generation<S: AppState>(
    State(state): State<S>,
) -> (StatusCode, Json<TriggerResponse>) {
    let outcome = state.scheduler().trigger_manual().await;

    if outcome.success {
        info!(post_id = outcome.post_id, "Manual generation succeeded");
        (
            StatusCode::OK,
            Json(TriggerResponse {
                success: true,
                message: "blog post generated".to_string(),
                post_id: outcome.post_id,
            }),
        )
    } else {
        let message = outcome
            .error
            .unwrap_or_else(|| "generation failed".to_string());
        warn!(message = %message, "Manual generation failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TriggerResponse {
                success: false,
                message,
                post_id: None,
            }),
        )
    }
}

#[instrument(skip(state))]
async fn blog_status<S: AppState>(
    State(state): State<S>,
) -> Result<ResponseJson<StatusResponse>, ApiError> {
    let status = state.scheduler().status().await?;

    Ok(ResponseJson(StatusResponse {
        success: true,
        is_running: status.is_running,
        next_generation: status.next_generation,
        stats: StatsResponse {
            total_generated: status.stats.total_generated,
            total_published: status.stats.total_published,
            today_generated: status.stats.today_generated,
            unused_topics: status.stats.unused_topics,
        },
    }))
}

pub fn create_admin_router<S: AppState>() -> Router<S> {
    Router::new()
        .route("/generate-blog", post(trigger_generation::<S>))
        .route("/blog-status", get(blog_status::<S>))
}
