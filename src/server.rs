//! HTTP server assembly: collaborators, routes, and middleware.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::store::LibSqlBackend;
use crate::submission::{LogNotifier, Notifier, SmtpNotifier, SubmissionService, submission_routes};
use crate::wizard::{WizardSession, wizard_routes};

/// Shared services behind the routes.
#[derive(Clone)]
pub struct AppState {
    pub submissions: Arc<SubmissionService>,
    pub wizard: Arc<WizardSession>,
}

impl AppState {
    /// Wire the submission service and the wizard session over one database.
    pub async fn new(db: Arc<LibSqlBackend>, notifier: Arc<dyn Notifier>) -> Self {
        let submissions = Arc::new(SubmissionService::new(db.clone(), notifier));
        let wizard = Arc::new(WizardSession::open(db, submissions.clone()).await);
        Self {
            submissions,
            wizard,
        }
    }
}

/// Build the full router with tracing and CORS middleware.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(submission_routes(state.submissions))
        .merge(wizard_routes(state.wizard))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Open storage, pick a notifier, and build the router from configuration.
pub async fn build_app(config: &AppConfig) -> crate::Result<Router> {
    let db = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
        None => {
            info!("SMTP_HOST not set; confirmations will only be logged");
            Arc::new(LogNotifier)
        }
    };

    Ok(app_routes(AppState::new(db, notifier).await))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "profile-intake"
    }))
}
