//! REST endpoint for one-shot submissions and the HTTP mapping of
//! [`SubmitOutcome`].

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::profile::FieldErrors;

use super::protocol::{CONFLICT_MESSAGE, INTERNAL_ERROR_MESSAGE, SubmissionService, SubmitOutcome};

impl IntoResponse for SubmitOutcome {
    fn into_response(self) -> Response {
        match self {
            SubmitOutcome::Created {
                record,
                confirmation_sent,
            } => (
                StatusCode::CREATED,
                Json(json!({
                    "submission": record,
                    "confirmationSent": confirmation_sent,
                })),
            )
                .into_response(),
            SubmitOutcome::Invalid(errors) => invalid_response(errors),
            SubmitOutcome::Conflict => (
                StatusCode::CONFLICT,
                Json(json!({ "message": CONFLICT_MESSAGE })),
            )
                .into_response(),
            SubmitOutcome::Failed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": INTERNAL_ERROR_MESSAGE })),
            )
                .into_response(),
        }
    }
}

/// 400 with `{errors: {path: [message]}}`.
pub fn invalid_response(errors: FieldErrors) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
}

/// Decode a JSON request body, reporting malformed input as a validation
/// failure at the empty path.
pub fn decode_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        let mut errors = FieldErrors::new();
        errors.add("", format!("Invalid JSON body: {e}"));
        invalid_response(errors)
    })
}

/// POST /api/form
///
/// Stateless commit: the body is the full profile.
async fn submit_form(State(service): State<Arc<SubmissionService>>, body: Bytes) -> Response {
    let value: Value = match decode_body(&body) {
        Ok(value) => value,
        Err(rejection) => return rejection,
    };
    service.submit_json(&value).await.into_response()
}

/// Build the submission REST routes.
pub fn submission_routes(service: Arc<SubmissionService>) -> Router {
    Router::new()
        .route("/api/form", post(submit_form))
        .with_state(service)
}
