//! File ingestion: decides whether an upload is carried as text or as base64 binary,
//! and extracts the payload for the template and current-CV steps.
//!
//! Pure functions only. Reading the multipart body lives in `upload.rs`.

pub mod upload;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use thiserror::Error;

use crate::models::{CurrentCvPayload, TemplatePayload};

const OCTET_STREAM: &str = "application/octet-stream";
const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    #[error("Please upload a PDF or Text file.")]
    UnsupportedType,

    #[error("Failed to read file.")]
    Unreadable,

    #[error("The selected file is empty.")]
    Empty,

    #[error("No file was provided.")]
    MissingFile,
}

impl IngestError {
    /// Unsupported types are a user input problem; the rest are I/O problems.
    pub fn is_validation(&self) -> bool {
        matches!(self, IngestError::UnsupportedType | IngestError::MissingFile)
    }
}

/// A file selected by the user, as received by the service.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    /// Declared content type, if the client sent one.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Effective MIME type: declared type, else guessed from the file name, else octet-stream.
    /// Parameters such as `; charset=utf-8` are dropped.
    pub fn mime_type(&self) -> String {
        let essence = self
            .content_type
            .as_deref()
            .map(|declared| declared.split(';').next().unwrap_or_default().trim());
        match essence {
            Some(declared) if !declared.is_empty() && declared != OCTET_STREAM => {
                declared.to_ascii_lowercase()
            }
            _ => mime_guess::from_path(&self.name)
                .first_raw()
                .unwrap_or(OCTET_STREAM)
                .to_string(),
        }
    }

    fn has_extension(&self, ext: &str) -> bool {
        self.name.to_ascii_lowercase().ends_with(ext)
    }
}

/// How a file's content is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    Text,
    Binary,
}

/// Template step: PDF, any image, and Word documents are binary; everything else is text.
pub fn classify_template(file: &UploadedFile) -> IngestMode {
    let mime = file.mime_type();
    if mime == PDF_MIME
        || mime.starts_with("image/")
        || file.has_extension(".docx")
        || file.has_extension(".doc")
    {
        IngestMode::Binary
    } else {
        IngestMode::Text
    }
}

/// Current-CV step: only exact `application/pdf` is binary, only plain text is text.
pub fn classify_current_cv(file: &UploadedFile) -> Option<IngestMode> {
    let mime = file.mime_type();
    if mime == PDF_MIME {
        Some(IngestMode::Binary)
    } else if mime == "text/plain" || file.has_extension(".txt") {
        Some(IngestMode::Text)
    } else {
        None
    }
}

pub fn ingest_template(file: &UploadedFile) -> Result<TemplatePayload, IngestError> {
    if file.bytes.is_empty() {
        return Err(IngestError::Empty);
    }
    let name = Some(file.name.clone());
    let payload = match classify_template(file) {
        IngestMode::Binary => TemplatePayload::binary(encode(&file.bytes), file.mime_type(), name),
        IngestMode::Text => TemplatePayload::text(decode_text(&file.bytes), file.mime_type(), name),
    };
    Ok(payload)
}

pub fn ingest_current_cv(file: &UploadedFile) -> Result<CurrentCvPayload, IngestError> {
    let mode = classify_current_cv(file).ok_or(IngestError::UnsupportedType)?;
    if file.bytes.is_empty() {
        return Err(IngestError::Empty);
    }
    let name = Some(file.name.clone());
    let payload = match mode {
        IngestMode::Binary => CurrentCvPayload::pdf(encode(&file.bytes), name),
        IngestMode::Text => CurrentCvPayload::text(decode_text(&file.bytes), name),
    };
    Ok(payload)
}

fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Lossy UTF-8: bytes that are not UTF-8 become U+FFFD instead of failing the upload.
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: Option<&str>, bytes: &'static [u8]) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            content_type: content_type.map(String::from),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn test_template_binary_types() {
        let cases = [
            file("cv.pdf", Some("application/pdf"), b"%PDF-1.4"),
            file("scan.png", Some("image/png"), b"\x89PNG"),
            file("photo", Some("image/jpeg"), b"\xFF\xD8"),
            file("cv.docx", Some("application/octet-stream"), b"PK\x03\x04"),
            file("old.doc", None, b"\xD0\xCF\x11\xE0"),
        ];
        for case in &cases {
            let payload = ingest_template(case).unwrap();
            assert!(payload.binary_data.is_some(), "{} should be binary", case.name);
            assert!(payload.text.is_none(), "{} should have no text", case.name);
        }
    }

    #[test]
    fn test_template_binary_payload_is_base64_of_bytes() {
        let payload = ingest_template(&file("cv.pdf", Some("application/pdf"), b"%PDF")).unwrap();
        assert_eq!(payload.binary_data.as_deref(), Some("JVBERg=="));
        assert_eq!(payload.mime_type, "application/pdf");
        assert_eq!(payload.name.as_deref(), Some("cv.pdf"));
    }

    #[test]
    fn test_template_other_types_are_text() {
        let cases = [
            file("cv.html", Some("text/html"), b"<html></html>"),
            file("cv.md", None, b"# Jane"),
            file("cv.json", Some("application/json"), b"{}"),
        ];
        for case in &cases {
            let payload = ingest_template(case).unwrap();
            assert!(payload.text.is_some(), "{} should be text", case.name);
            assert!(payload.binary_data.is_none());
        }
    }

    #[test]
    fn test_template_mime_guessed_when_not_declared() {
        let html = file("template.html", None, b"<p>hi</p>");
        assert_eq!(html.mime_type(), "text/html");
        let unknown = file("template", None, b"hi");
        assert_eq!(unknown.mime_type(), OCTET_STREAM);
        assert_eq!(classify_template(&unknown), IngestMode::Text);
    }

    #[test]
    fn test_template_guessed_pdf_is_binary() {
        let pdf = file("cv.pdf", Some("application/octet-stream"), b"%PDF");
        assert_eq!(classify_template(&pdf), IngestMode::Binary);
    }

    #[test]
    fn test_text_strips_bom() {
        let with_bom = file("cv.html", Some("text/html"), b"\xEF\xBB\xBF<p>x</p>");
        assert_eq!(ingest_template(&with_bom).unwrap().text.as_deref(), Some("<p>x</p>"));
    }

    #[test]
    fn test_non_utf8_text_is_still_text() {
        let latin1 = file("cv.html", Some("text/html"), b"<p>Caf\xE9</p>");
        let payload = ingest_template(&latin1).unwrap();
        assert_eq!(payload.text.as_deref(), Some("<p>Caf\u{FFFD}</p>"));
        assert!(payload.binary_data.is_none());

        let cv = ingest_current_cv(&file("cv.txt", Some("text/plain"), b"Jos\xE9")).unwrap();
        assert_eq!(cv.text, "Jos\u{FFFD}");
    }

    #[test]
    fn test_declared_type_parameters_are_ignored() {
        let cv = file("cv", Some("text/plain; charset=utf-8"), b"Jane");
        assert_eq!(cv.mime_type(), "text/plain");
        assert_eq!(classify_current_cv(&cv), Some(IngestMode::Text));

        let pdf = file("upload", Some("Application/PDF; name=cv.pdf"), b"%PDF");
        assert_eq!(classify_current_cv(&pdf), Some(IngestMode::Binary));
    }

    #[test]
    fn test_empty_template_rejected() {
        let empty = file("cv.html", Some("text/html"), b"");
        assert_eq!(ingest_template(&empty), Err(IngestError::Empty));
    }

    #[test]
    fn test_current_cv_pdf_and_text() {
        let pdf = ingest_current_cv(&file("cv.pdf", Some("application/pdf"), b"%PDF")).unwrap();
        assert!(pdf.binary_data.is_some());
        assert!(pdf.text.is_empty());

        let txt = ingest_current_cv(&file("cv.txt", None, b"Jane Doe")).unwrap();
        assert_eq!(txt.text, "Jane Doe");
        assert!(txt.binary_data.is_none());

        let plain = ingest_current_cv(&file("cv", Some("text/plain"), b"Jane")).unwrap();
        assert_eq!(plain.text, "Jane");
    }

    #[test]
    fn test_current_cv_rejects_other_types() {
        let cases = [
            file("cv.docx", None, b"PK"),
            file("cv.html", Some("text/html"), b"<p></p>"),
            file("cv.png", Some("image/png"), b"\x89PNG"),
        ];
        for case in &cases {
            let err = ingest_current_cv(case).unwrap_err();
            assert_eq!(err, IngestError::UnsupportedType, "{}", case.name);
            assert!(err.is_validation());
            assert_eq!(err.to_string(), "Please upload a PDF or Text file.");
        }
    }
}
