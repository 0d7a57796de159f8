mod auth;
mod config;
mod defaults;
mod errors;
mod export;
mod generation;
mod ingest;
mod llm_client;
mod models;
mod routes;
mod state;
mod wizard;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::defaults::{DefaultStore, InMemoryDefaultStore, RedisDefaultStore};
use crate::export::ChromiumPdfRenderer;
use crate::generation::GeminiCvGenerator;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::wizard::WizardService;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Matcher API v{}", env!("CARGO_PKG_VERSION"));

    // Saved defaults: Redis when configured, process memory otherwise
    let store: Arc<dyn DefaultStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisDefaultStore::connect(url).await?),
        None => {
            warn!("REDIS_URL not set; saved defaults are kept in memory and lost on restart");
            Arc::new(InMemoryDefaultStore::new())
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone());
    if llm.has_api_key() {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    } else {
        warn!("GEMINI_API_KEY not set; generation requests will fail until it is configured");
    }
    let generator = Arc::new(GeminiCvGenerator::new(llm));

    let mut pdf_renderer = ChromiumPdfRenderer::new(
        config.pdf_renderer_bin.clone(),
        config.pdf_settle,
        config.pdf_render_timeout,
    );
    if let Some(dir) = &config.pdf_scratch_dir {
        pdf_renderer = pdf_renderer.with_scratch_root(dir);
    }
    let pdf_renderer = Arc::new(pdf_renderer);
    info!("PDF renderer: {}", config.pdf_renderer_bin);

    let wizard = Arc::new(
        WizardService::new(store, generator).with_idle_ttl(config.session_idle_ttl),
    );
    tokio::spawn(Arc::clone(&wizard).run_idle_sweeper(SESSION_SWEEP_INTERVAL));
    info!("Idle wizard sessions expire after {:?}", config.session_idle_ttl);

    // Build app state
    let state = AppState {
        config: config.clone(),
        wizard,
        pdf_renderer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
