//! PDF export through a headless Chromium process.
//!
//! The document is written to a scratch directory, printed with an A4 page rule and
//! zero margins, and the scratch directory is removed whether or not printing succeeded.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::preview::inject_into_head;
use super::ExportError;

/// A4 width at 96 dpi.
pub const A4_WIDTH_PX: u32 = 794;
pub const A4_HEIGHT_PX: u32 = 1123;

const PRINT_STYLE_ID: &str = "cv-matcher-print";

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>, ExportError>;
}

pub struct ChromiumPdfRenderer {
    binary: String,
    settle: Duration,
    timeout: Duration,
    /// Parent of the per-job scratch directories. The system temp dir when unset.
    scratch_root: Option<PathBuf>,
}

impl ChromiumPdfRenderer {
    pub fn new(binary: impl Into<String>, settle: Duration, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            settle,
            timeout,
            scratch_root: None,
        }
    }

    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    fn scratch_dir(&self) -> std::io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("cv-matcher-pdf-");
        match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }

    /// Browser flags for one print job. `--virtual-time-budget` lets fonts and images
    /// finish loading before the page is printed.
    fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--hide-scrollbars".to_string(),
            "--no-pdf-header-footer".to_string(),
            "--force-device-scale-factor=2".to_string(),
            format!("--window-size={A4_WIDTH_PX},{A4_HEIGHT_PX}"),
            format!("--virtual-time-budget={}", self.settle.as_millis()),
            "--run-all-compositor-stages-before-draw".to_string(),
            format!("--print-to-pdf={}", output.display()),
            format!("file://{}", input.display()),
        ]
    }
}

#[async_trait]
impl PdfRenderer for ChromiumPdfRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, ExportError> {
        let scratch = self.scratch_dir()?;
        let input: PathBuf = scratch.path().join("cv.html");
        let output: PathBuf = scratch.path().join("cv.pdf");
        tokio::fs::write(&input, print_document(html)).await?;

        let mut command = Command::new(&self.binary);
        command
            .args(self.args(&input, &output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| ExportError::Renderer(format!("failed to launch {}: {e}", self.binary)))?;

        let finished = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ExportError::Timeout(self.timeout))??;

        if !finished.status.success() {
            let stderr = String::from_utf8_lossy(&finished.stderr);
            warn!(status = %finished.status, stderr = %stderr.trim(), "PDF renderer exited with failure");
            return Err(ExportError::Renderer(format!(
                "{} exited with {}",
                self.binary, finished.status
            )));
        }

        let pdf = tokio::fs::read(&output).await.map_err(|e| {
            warn!(error = %e, "PDF renderer produced no output file");
            ExportError::InvalidOutput
        })?;
        if !pdf.starts_with(b"%PDF") {
            return Err(ExportError::InvalidOutput);
        }

        debug!(bytes = pdf.len(), "PDF rendered");
        Ok(pdf)
    }
}

/// Adds the print rules: A4 pages, zero margins, fixed A4 width, opaque white background.
/// Height is left to content so nothing is clipped and no blank trailing page appears.
pub fn print_document(html: &str) -> String {
    if html.contains(PRINT_STYLE_ID) {
        return html.to_string();
    }
    let style = format!(
        r#"<style id="{PRINT_STYLE_ID}">
@page {{ size: A4; margin: 0; }}
html, body {{
  width: {A4_WIDTH_PX}px !important;
  margin: 0 !important;
  padding: 0 !important;
  height: auto !important;
  min-height: 0 !important;
  background: #ffffff !important;
  -webkit-print-color-adjust: exact;
  print-color-adjust: exact;
}}
</style>"#
    );
    inject_into_head(html, &style)
}
