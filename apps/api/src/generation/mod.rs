// CV generation: request assembly, the structured LLM call, and response validation.
// All LLM calls go through llm_client; nothing here talks to Gemini directly.

pub mod generator;
pub mod prompts;
pub mod request_builder;

pub use generator::{CvGenerator, GeminiCvGenerator, GenerationError};
pub use request_builder::{build_parts, GenerationInputs};
