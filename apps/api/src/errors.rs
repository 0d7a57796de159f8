use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::defaults::StoreError;
use crate::generation::GenerationError;
use crate::ingest::IngestError;
use crate::wizard::WizardError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<WizardError> for AppError {
    fn from(e: WizardError) -> Self {
        let message = e.to_string();
        match e {
            WizardError::Validation(msg) => AppError::Validation(msg),
            WizardError::Busy | WizardError::WrongStep(_) => AppError::Conflict(message),
            WizardError::NoSavedDefault | WizardError::NoResult => AppError::NotFound(message),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        if e.is_validation() {
            AppError::Validation(e.to_string())
        } else {
            AppError::Ingestion(e.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Ingestion(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INGESTION_ERROR",
                msg.clone(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Generation(e) => match e {
                GenerationError::Configuration(msg) => {
                    tracing::warn!("Generation not configured: {msg}");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "CONFIGURATION_ERROR",
                        msg.clone(),
                    )
                }
                GenerationError::EmptyResponse => {
                    (StatusCode::BAD_GATEWAY, "EMPTY_RESPONSE", e.to_string())
                }
                GenerationError::ResponseParse => {
                    (StatusCode::BAD_GATEWAY, "RESPONSE_PARSE_ERROR", e.to_string())
                }
                GenerationError::Service(msg) => {
                    tracing::error!("Generation service error: {msg}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "LLM_ERROR",
                        "The generation service failed. Please try again.".to_string(),
                    )
                }
            },
            AppError::Export(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXPORT_ERROR",
                msg.clone(),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Saved defaults are unavailable right now".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
