//! Assembles the ordered content parts of a generation request:
//! instructions → template → current CV → job description.
//!
//! Each document is sent in exactly one representation, binary or text, never both.

use crate::generation::prompts::{
    CURRENT_CV_PDF_LABEL, CURRENT_CV_TEXT_LABEL, GENERATION_INSTRUCTIONS, JOB_DESCRIPTION_LABEL,
    TEMPLATE_DOCUMENT_LABEL, TEMPLATE_TEXT_LABEL,
};
use crate::llm_client::ContentPart;
use crate::models::{CurrentCvPayload, JobDescription, TemplatePayload};

const PDF_MIME: &str = "application/pdf";

/// Inputs accumulated by the wizard for one generation.
#[derive(Debug, Clone)]
pub struct GenerationInputs {
    pub template: TemplatePayload,
    pub current_cv: CurrentCvPayload,
    pub job_description: JobDescription,
}

pub fn build_parts(inputs: &GenerationInputs) -> Vec<ContentPart> {
    let mut parts = vec![ContentPart::text(GENERATION_INSTRUCTIONS)];
    push_template(&mut parts, &inputs.template);
    push_current_cv(&mut parts, &inputs.current_cv);
    parts.push(ContentPart::text(format!(
        "{JOB_DESCRIPTION_LABEL}{}",
        inputs.job_description.as_str()
    )));
    parts
}

fn push_template(parts: &mut Vec<ContentPart>, template: &TemplatePayload) {
    match &template.binary_data {
        Some(data) => {
            parts.push(ContentPart::text(TEMPLATE_DOCUMENT_LABEL));
            parts.push(ContentPart::inline(template.mime_type.as_str(), data.as_str()));
        }
        None => {
            let text = template.text.as_deref().unwrap_or_default();
            parts.push(ContentPart::text(format!("{TEMPLATE_TEXT_LABEL}{text}")));
        }
    }
}

fn push_current_cv(parts: &mut Vec<ContentPart>, current_cv: &CurrentCvPayload) {
    match &current_cv.binary_data {
        Some(data) => {
            parts.push(ContentPart::text(CURRENT_CV_PDF_LABEL));
            parts.push(ContentPart::inline(PDF_MIME, data.as_str()));
        }
        None => parts.push(ContentPart::text(format!(
            "{CURRENT_CV_TEXT_LABEL}{}",
            current_cv.text
        ))),
    }
}
