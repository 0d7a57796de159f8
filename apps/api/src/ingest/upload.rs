use axum::extract::Multipart;
use tracing::warn;

use crate::ingest::{IngestError, UploadedFile};

/// Multipart field carrying the selected file.
pub const FILE_FIELD: &str = "file";

/// Reads the `file` field of a multipart upload. Other fields are ignored.
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, IngestError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Failed to read multipart body: {e}");
        IngestError::Unreadable
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            warn!("Failed to read uploaded file '{name}': {e}");
            IngestError::Unreadable
        })?;

        return Ok(UploadedFile {
            name,
            content_type,
            bytes,
        });
    }

    Err(IngestError::MissingFile)
}
