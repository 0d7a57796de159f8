use serde::{Deserialize, Serialize};

/// The CV layout/styling source the generated CV is modelled on.
///
/// Exactly one of `text` / `binary_data` is set once ingestion completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePayload {
    pub text: Option<String>,
    /// Base64 (standard alphabet) of the raw file bytes.
    #[serde(alias = "base64")]
    pub binary_data: Option<String>,
    pub mime_type: String,
    pub name: Option<String>,
}

impl TemplatePayload {
    pub fn text(content: String, mime_type: impl Into<String>, name: Option<String>) -> Self {
        Self {
            text: Some(content),
            binary_data: None,
            mime_type: mime_type.into(),
            name,
        }
    }

    pub fn binary(base64: String, mime_type: impl Into<String>, name: Option<String>) -> Self {
        Self {
            text: None,
            binary_data: Some(base64),
            mime_type: mime_type.into(),
            name,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.binary_data.is_some()
    }

    /// True when exactly one representation is present and it is non-empty.
    pub fn is_well_formed(&self) -> bool {
        match (&self.text, &self.binary_data) {
            (Some(text), None) => !text.is_empty(),
            (None, Some(data)) => !data.is_empty(),
            _ => false,
        }
    }
}

/// The user's existing CV: pasted/uploaded text, or a PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentCvPayload {
    #[serde(default)]
    pub text: String,
    /// Base64 of a PDF upload.
    #[serde(alias = "pdfBase64")]
    pub binary_data: Option<String>,
    pub name: Option<String>,
}

impl CurrentCvPayload {
    pub fn text(content: String, name: Option<String>) -> Self {
        Self {
            text: content,
            binary_data: None,
            name,
        }
    }

    pub fn pdf(base64: String, name: Option<String>) -> Self {
        Self {
            text: String::new(),
            binary_data: Some(base64),
            name,
        }
    }

    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || self.binary_data.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// A non-blank job description. The original text (whitespace included) is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobDescription(String);

impl JobDescription {
    pub fn parse(raw: &str) -> Result<Self, &'static str> {
        if raw.trim().is_empty() {
            return Err("Please provide the job description.");
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_constructors_hold_exactly_one_representation() {
        let text = TemplatePayload::text("<html></html>".into(), "text/html", None);
        assert!(text.is_well_formed());
        assert!(!text.is_binary());

        let binary = TemplatePayload::binary("JVBERi0=".into(), "application/pdf", None);
        assert!(binary.is_well_formed());
        assert!(binary.is_binary());
        assert!(binary.text.is_none());
    }

    #[test]
    fn test_template_with_both_representations_is_malformed() {
        let payload = TemplatePayload {
            text: Some("a".into()),
            binary_data: Some("b".into()),
            mime_type: "text/html".into(),
            name: None,
        };
        assert!(!payload.is_well_formed());
    }

    #[test]
    fn test_template_accepts_legacy_base64_field() {
        let json = r#"{"text":null,"base64":"AAAA","mimeType":"image/png","name":"t.png"}"#;
        let payload: TemplatePayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.binary_data.as_deref(), Some("AAAA"));
        assert!(payload.is_well_formed());
    }

    #[test]
    fn test_template_serializes_camel_case() {
        let payload = TemplatePayload::binary("AAAA".into(), "application/pdf", Some("t.pdf".into()));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["binaryData"], "AAAA");
        assert_eq!(value["mimeType"], "application/pdf");
    }

    #[test]
    fn test_cv_whitespace_text_has_no_content() {
        assert!(!CurrentCvPayload::text("   \n".into(), None).has_content());
        assert!(CurrentCvPayload::text("Jane Doe".into(), None).has_content());
        assert!(CurrentCvPayload::pdf("JVBERi0=".into(), None).has_content());
    }

    #[test]
    fn test_cv_accepts_legacy_pdf_field() {
        let json = r#"{"text":"","pdfBase64":"JVBERi0=","name":"cv.pdf"}"#;
        let payload: CurrentCvPayload = serde_json::from_str(json).unwrap();
        assert!(payload.has_content());
    }

    #[test]
    fn test_job_description_rejects_blank() {
        assert!(JobDescription::parse("  \t").is_err());
        let jd = JobDescription::parse("  Senior Rust Engineer ").unwrap();
        assert_eq!(jd.as_str(), "  Senior Rust Engineer ");
    }
}
