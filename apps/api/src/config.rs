use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 60 * 60;

/// Application configuration loaded from environment variables.
/// Everything has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Checked when a generation is requested, not at startup.
    pub gemini_api_key: Option<String>,
    /// Saved defaults live in memory when unset.
    pub redis_url: Option<String>,
    pub max_upload_bytes: usize,
    pub pdf_renderer_bin: String,
    pub pdf_settle: Duration,
    pub pdf_render_timeout: Duration,
    /// Where PDF jobs get their scratch directories. The system temp dir when unset.
    pub pdf_scratch_dir: Option<PathBuf>,
    /// Wizard sessions untouched for this long are discarded.
    pub session_idle_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: parse_or(&optional, "PORT", 8080)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            gemini_api_key: optional("GEMINI_API_KEY"),
            redis_url: optional("REDIS_URL"),
            max_upload_bytes: parse_or(&optional, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            pdf_renderer_bin: optional("PDF_RENDERER_BIN").unwrap_or_else(|| "chromium".to_string()),
            pdf_settle: Duration::from_millis(parse_or(&optional, "PDF_SETTLE_MS", 2000)?),
            pdf_render_timeout: Duration::from_secs(parse_or(
                &optional,
                "PDF_RENDER_TIMEOUT_SECS",
                60,
            )?),
            pdf_scratch_dir: optional("PDF_SCRATCH_DIR").map(PathBuf::from),
            session_idle_ttl: Duration::from_secs(parse_or(
                &optional,
                "SESSION_IDLE_TTL_SECS",
                DEFAULT_SESSION_IDLE_TTL_SECS,
            )?),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
