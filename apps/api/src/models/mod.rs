pub mod payload;
pub mod result;

pub use payload::{CurrentCvPayload, JobDescription, TemplatePayload};
pub use result::{GenerationResult, ScoreBand};
