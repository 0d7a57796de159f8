use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::defaults::ArtifactKind;
use crate::errors::AppError;
use crate::ingest::upload::read_upload;
use crate::state::AppState;
use crate::wizard::WizardView;

#[derive(Deserialize)]
pub struct TextInput {
    pub text: String,
}

/// GET /api/v1/wizard
pub async fn handle_get_wizard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(state.wizard.view(&user.id).await?))
}

/// POST /api/v1/wizard/next
pub async fn handle_next(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(state.wizard.next(&user.id).await?))
}

/// POST /api/v1/wizard/back
pub async fn handle_back(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(state.wizard.back(&user.id).await?))
}

/// POST /api/v1/wizard/restart
pub async fn handle_restart(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(state.wizard.restart(&user.id).await?))
}

/// POST /api/v1/wizard/logout
pub async fn handle_logout(State(state): State<AppState>, user: CurrentUser) -> StatusCode {
    state.wizard.logout(&user.id).await;
    StatusCode::NO_CONTENT
}

/// POST /api/v1/wizard/template (multipart, field `file`)
pub async fn handle_upload_template(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Json<WizardView>, AppError> {
    let upload = read_upload(multipart).await;
    Ok(Json(state.wizard.upload_template(&user.id, upload).await?))
}

/// POST /api/v1/wizard/current-cv (multipart, field `file`)
pub async fn handle_upload_current_cv(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<Json<WizardView>, AppError> {
    let upload = read_upload(multipart).await;
    Ok(Json(state.wizard.upload_current_cv(&user.id, upload).await?))
}

/// PUT /api/v1/wizard/current-cv/text
pub async fn handle_current_cv_text(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<TextInput>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(
        state.wizard.set_current_cv_text(&user.id, req.text).await?,
    ))
}

/// PUT /api/v1/wizard/job-description
pub async fn handle_job_description(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<TextInput>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(
        state.wizard.set_job_description(&user.id, req.text).await?,
    ))
}

/// POST /api/v1/wizard/defaults/:kind/select
pub async fn handle_select_default(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(kind): Path<ArtifactKind>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(state.wizard.select_saved(&user.id, kind).await?))
}

/// POST /api/v1/wizard/defaults/:kind
pub async fn handle_save_default(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(kind): Path<ArtifactKind>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(state.wizard.save_default(&user.id, kind).await?))
}

/// DELETE /api/v1/wizard/defaults/:kind
pub async fn handle_remove_default(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(kind): Path<ArtifactKind>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(state.wizard.remove_default(&user.id, kind).await?))
}

/// POST /api/v1/wizard/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(state.wizard.generate(&user.id).await?))
}
