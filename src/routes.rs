//! REST endpoints for the registration funnel.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use crate::error::{FunnelError, RuleError};
use crate::service::StepService;

/// Shared state for funnel routes.
#[derive(Clone)]
pub struct FunnelRouteState {
    pub service: Arc<StepService>,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for FunnelError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            FunnelError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            FunnelError::BadPayload(_) => (StatusCode::BAD_REQUEST, "bad_payload"),
            FunnelError::Rule(RuleError::Unsupported { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "unsupported_rule")
            }
            FunnelError::Rule(_) => (StatusCode::INTERNAL_SERVER_ERROR, "invalid_rule"),
            FunnelError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            error!(error = %self, "Funnel request failed");
        } else {
            warn!(error = %self, "Funnel request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Body of `POST /api/registration/step/{slug}`.
#[derive(Debug, Deserialize)]
struct SubmitRequest {
    data: Value,
}

/// Build the funnel REST routes.
pub fn funnel_routes(state: FunnelRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/registration/steps", get(list_steps))
        .route(
            "/api/registration/step/{slug}",
            get(get_step).post(submit_step),
        )
        .route("/api/registration/summary", get(get_summary))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "funnel"
    }))
}

/// GET /api/registration/steps
async fn list_steps(State(state): State<FunnelRouteState>) -> impl IntoResponse {
    Json(state.service.list_steps())
}

/// GET /api/registration/step/{slug}
async fn get_step(
    State(state): State<FunnelRouteState>,
    Path(slug): Path<String>,
) -> Result<Response, FunnelError> {
    let view = state.service.get_step(&slug).await?;
    Ok(Json(view).into_response())
}

/// POST /api/registration/step/{slug}
///
/// The raw body is parsed here rather than through the `Json` extractor so
/// that every malformed body maps to a 400 `bad_payload`.
async fn submit_step(
    State(state): State<FunnelRouteState>,
    Path(slug): Path<String>,
    body: Bytes,
) -> Result<Response, FunnelError> {
    let request: SubmitRequest = serde_json::from_slice(&body)
        .map_err(|e| FunnelError::BadPayload(format!("invalid JSON body: {e}")))?;
    let outcome = state.service.submit_step(&slug, request.data).await?;
    Ok(Json(outcome).into_response())
}

/// GET /api/registration/summary
async fn get_summary(State(state): State<FunnelRouteState>) -> Result<Response, FunnelError> {
    let summary = state.service.get_summary().await?;
    Ok(Json(summary).into_response())
}
