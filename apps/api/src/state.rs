use std::sync::Arc;

use crate::config::Config;
use crate::export::PdfRenderer;
use crate::wizard::WizardService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Wizard sessions, saved defaults and the generator behind them.
    pub wizard: Arc<WizardService>,
    /// Swappable so tests run without a browser.
    pub pdf_renderer: Arc<dyn PdfRenderer>,
}
