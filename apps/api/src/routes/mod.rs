pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::auth;
use crate::export::handlers as export;
use crate::state::AppState;
use crate::wizard::handlers as wizard;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/session", get(auth::handle_session))
        // Wizard steps
        .route("/api/v1/wizard", get(wizard::handle_get_wizard))
        .route("/api/v1/wizard/next", post(wizard::handle_next))
        .route("/api/v1/wizard/back", post(wizard::handle_back))
        .route("/api/v1/wizard/restart", post(wizard::handle_restart))
        .route("/api/v1/wizard/logout", post(wizard::handle_logout))
        .route("/api/v1/wizard/template", post(wizard::handle_upload_template))
        .route(
            "/api/v1/wizard/current-cv",
            post(wizard::handle_upload_current_cv),
        )
        .route(
            "/api/v1/wizard/current-cv/text",
            put(wizard::handle_current_cv_text),
        )
        .route(
            "/api/v1/wizard/job-description",
            put(wizard::handle_job_description),
        )
        // Saved defaults
        .route(
            "/api/v1/wizard/defaults/:kind/select",
            post(wizard::handle_select_default),
        )
        .route(
            "/api/v1/wizard/defaults/:kind",
            post(wizard::handle_save_default).delete(wizard::handle_remove_default),
        )
        // Generation and result
        .route("/api/v1/wizard/generate", post(wizard::handle_generate))
        .route("/api/v1/wizard/result", get(export::handle_get_result))
        .route("/api/v1/wizard/result/preview", get(export::handle_preview))
        .route(
            "/api/v1/wizard/result/download/:format",
            get(export::handle_download),
        )
        .layer(upload_limit)
        .with_state(state)
}
