//! Result post-processing: every transform is a function of the generated `htmlContent`.
//!
//! - `preview`: responsive overrides for the in-app preview only
//! - `word`: Word-compatible HTML with clickable links
//! - `pdf`: A4 PDF through a headless renderer
//! - HTML download is the content verbatim

pub mod handlers;
pub mod linkify;
pub mod pdf;
pub mod preview;
pub mod word;

use serde::Deserialize;
use thiserror::Error;

pub use pdf::{ChromiumPdfRenderer, PdfRenderer};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Renderer failed: {0}")]
    Renderer(String),

    #[error("Renderer did not finish within {0:?}")]
    Timeout(std::time::Duration),

    #[error("Renderer produced no PDF")]
    InvalidOutput,
}

/// Downloadable artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Html,
    Pdf,
    Doc,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Html => "optimized-cv.html",
            ExportFormat::Pdf => "optimized-cv.pdf",
            ExportFormat::Doc => "optimized-cv.doc",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Doc => word::WORD_MIME,
        }
    }
}
