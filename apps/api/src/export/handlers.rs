use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::export::preview::preview_document;
use crate::export::word::word_document;
use crate::export::ExportFormat;
use crate::models::ScoreBand;
use crate::state::AppState;

pub const PDF_FALLBACK_MESSAGE: &str =
    "Failed to generate PDF. Please try downloading as HTML instead.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    /// Exactly as generated, for the raw code view.
    pub html_content: String,
    pub match_score: f64,
    pub band: ScoreBand,
    pub explanation: String,
}

/// GET /api/v1/wizard/result
pub async fn handle_get_result(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ResultResponse>, AppError> {
    let result = state.wizard.result(&user.id).await?;
    Ok(Json(ResultResponse {
        band: result.band(),
        html_content: result.html_content,
        match_score: result.match_score,
        explanation: result.explanation,
    }))
}

/// GET /api/v1/wizard/result/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Html<String>, AppError> {
    let result = state.wizard.result(&user.id).await?;
    Ok(Html(preview_document(&result.html_content)))
}

/// GET /api/v1/wizard/result/download/:format
pub async fn handle_download(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(format): Path<ExportFormat>,
) -> Result<Response, AppError> {
    let result = state.wizard.result(&user.id).await?;

    let body: Vec<u8> = match format {
        ExportFormat::Html => result.html_content.into_bytes(),
        ExportFormat::Doc => word_document(&result.html_content).context("Word export failed")?,
        ExportFormat::Pdf => state
            .pdf_renderer
            .render(&result.html_content)
            .await
            .map_err(|e| {
                error!(user_id = %user.id, "PDF export failed: {e}");
                AppError::Export(PDF_FALLBACK_MESSAGE.to_string())
            })?,
    };

    info!(user_id = %user.id, file = format.file_name(), bytes = body.len(), "CV downloaded");
    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        body,
    )
        .into_response())
}
