//! CV generation: one structured call to the LLM and validation of its answer.
//!
//! Flow: build_parts → LlmClient::call_json (JSON schema enforced) → parse → GenerationResult.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::generation::prompts::generation_response_schema;
use crate::llm_client::{strip_code_fences, ContentPart, LlmClient, LlmError, MODEL};
use crate::models::GenerationResult;

pub const MISSING_CREDENTIAL_MESSAGE: &str = "Gemini API key is missing. \
    1. Add GEMINI_API_KEY to the service environment. \
    2. Redeploy the service so the key is picked up.";

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Deployment-time misconfiguration. Raised before any network call.
    #[error("{0}")]
    Configuration(String),

    #[error("No response from the generation service.")]
    EmptyResponse,

    #[error("Failed to parse the generated CV data.")]
    ResponseParse,

    #[error("Generation service error: {0}")]
    Service(String),
}

impl From<LlmError> for GenerationError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey => {
                GenerationError::Configuration(MISSING_CREDENTIAL_MESSAGE.to_string())
            }
            LlmError::EmptyContent => GenerationError::EmptyResponse,
            other => GenerationError::Service(other.to_string()),
        }
    }
}

/// Produces a `GenerationResult` from assembled request parts.
///
/// Carried in `AppState` as `Arc<dyn CvGenerator>` so the wizard does not depend on the
/// concrete backend.
#[async_trait]
pub trait CvGenerator: Send + Sync {
    async fn generate(&self, parts: Vec<ContentPart>) -> Result<GenerationResult, GenerationError>;
}

/// Gemini-backed generator.
pub struct GeminiCvGenerator {
    llm: LlmClient,
}

impl GeminiCvGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CvGenerator for GeminiCvGenerator {
    async fn generate(&self, parts: Vec<ContentPart>) -> Result<GenerationResult, GenerationError> {
        if !self.llm.has_api_key() {
            return Err(GenerationError::Configuration(
                MISSING_CREDENTIAL_MESSAGE.to_string(),
            ));
        }

        info!("Requesting CV generation from {MODEL} ({} parts)", parts.len());
        let raw = self
            .llm
            .call_json(&parts, &generation_response_schema())
            .await?;

        let result = parse_generation_result(&raw)?;
        info!("CV generated: match score {}", result.match_score);
        Ok(result)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGenerationResult {
    html_content: String,
    match_score: f64,
    explanation: String,
}

/// Parses and normalises the model's JSON answer.
///
/// The raw text is logged on failure and never returned to the caller.
pub fn parse_generation_result(raw: &str) -> Result<GenerationResult, GenerationError> {
    if raw.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let parsed: RawGenerationResult = serde_json::from_str(strip_code_fences(raw, "json"))
        .map_err(|e| {
            error!("Failed to parse generation response ({e}): {raw}");
            GenerationError::ResponseParse
        })?;

    let html_content = strip_code_fences(&parsed.html_content, "html").to_string();
    if html_content.is_empty() {
        error!("Generation response has empty htmlContent: {raw}");
        return Err(GenerationError::ResponseParse);
    }
    if !html_content.to_ascii_lowercase().contains("<html") {
        warn!("Generated htmlContent is not a complete HTML document");
    }

    let match_score = if (0.0..=100.0).contains(&parsed.match_score) {
        parsed.match_score
    } else {
        warn!(
            "matchScore {} outside 0-100, clamping",
            parsed.match_score
        );
        parsed.match_score.clamp(0.0, 100.0)
    };

    Ok(GenerationResult {
        html_content,
        match_score,
        explanation: parsed.explanation,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
