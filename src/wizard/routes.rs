//! REST endpoints driving the wizard session.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::error::WizardError;
use crate::submission::routes::{decode_body, invalid_response};

use super::session::WizardSession;
use super::update::{StepUpdate, parse_step_update};

impl IntoResponse for WizardError {
    fn into_response(self) -> Response {
        match self {
            WizardError::StepInvalid { errors, .. } => invalid_response(errors),
            other => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": other.to_string() })),
            )
                .into_response(),
        }
    }
}

/// Decode a step payload, answering 400 `{errors}` keyed by field path.
fn decode_update(body: &Bytes) -> Result<StepUpdate, Response> {
    let raw = decode_body::<Value>(body)?;
    parse_step_update(&raw).map_err(invalid_response)
}

/// GET /api/wizard
async fn get_snapshot(State(session): State<Arc<WizardSession>>) -> impl IntoResponse {
    Json(session.snapshot().await)
}

/// PUT /api/wizard/draft
async fn save_draft(State(session): State<Arc<WizardSession>>, body: Bytes) -> Response {
    match decode_update(&body) {
        Ok(update) => Json(session.save_draft(update).await).into_response(),
        Err(rejection) => rejection,
    }
}

/// POST /api/wizard/next
///
/// 400 `{errors}` when the step gate fails, 400 `{message}` when the update
/// belongs to another step.
async fn next_step(State(session): State<Arc<WizardSession>>, body: Bytes) -> Response {
    let update = match decode_update(&body) {
        Ok(update) => update,
        Err(rejection) => return rejection,
    };
    match session.next(update).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/wizard/back
async fn previous_step(State(session): State<Arc<WizardSession>>) -> impl IntoResponse {
    Json(session.back().await)
}

/// POST /api/wizard/jump/{step}
async fn jump_to(
    State(session): State<Arc<WizardSession>>,
    Path(step): Path<String>,
) -> impl IntoResponse {
    Json(session.jump(&step).await)
}

/// POST /api/wizard/submit
async fn submit(State(session): State<Arc<WizardSession>>) -> Response {
    match session.submit().await {
        Ok(outcome) => outcome.into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/wizard/reset
async fn reset(State(session): State<Arc<WizardSession>>) -> impl IntoResponse {
    Json(session.reset().await)
}

/// Build the wizard REST routes.
pub fn wizard_routes(session: Arc<WizardSession>) -> Router {
    Router::new()
        .route("/api/wizard", get(get_snapshot))
        .route("/api/wizard/draft", put(save_draft))
        .route("/api/wizard/next", post(next_step))
        .route("/api/wizard/back", post(previous_step))
        .route("/api/wizard/jump/{step}", post(jump_to))
        .route("/api/wizard/submit", post(submit))
        .route("/api/wizard/reset", post(reset))
        .with_state(session)
}
