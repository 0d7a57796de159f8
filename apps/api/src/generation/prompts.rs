// All LLM prompt constants for CV generation.
// Reuses the schema builder from llm_client::prompts.

use serde_json::Value;

use crate::llm_client::prompts::{required_object_schema, SchemaField, SchemaType};

/// Fixed instruction block sent as the first part of every generation request.
pub const GENERATION_INSTRUCTIONS: &str = r#"You are an ATS-optimization specialist and an experienced web developer.
Produce a NEW CV tailored to one job description, reusing the exact HTML/CSS format of the provided template.

TEMPLATE FIDELITY (the output is also printed to PDF):
1. Keep every CSS class, inline style and HTML tag of the template unchanged.
2. Keep all structural elements (divs, tables, headers, footers) exactly where they are.
3. Replace only the text content inside the existing tags.
4. Preserve font imports (<link> or @import statements such as Google Fonts).
5. Keep every colour (text, background, borders) identical to the template.
6. Keep all spacing (margins, padding, line heights) identical to the template.
7. Wrap every email address and profile URL in a valid <a> tag with an href (href="mailto:..." or href="https://...").
8. Return a complete, valid HTML document: <!DOCTYPE html>, <html>, <head> and <body>.
9. MOBILE: include <meta name="viewport" content="width=device-width, initial-scale=1.0"> in <head> and make the CSS responsive (max-width: 800px, width: 100%, fluid typography, media queries). Below 768px wide, use a 15px-16px base font, stack columns vertically and never require horizontal scrolling.

INPUTS:
1. Template CV: the structure and styling to use. If it is a PDF, an image or a Word document, recreate its layout and styling in HTML/CSS. If it is HTML, use it directly.
2. Current CV: the candidate's work history, education, skills, projects and achievements.
3. Job Description: the target role's requirements, skills and responsibilities.

STEPS:
1. Identify the required skills, keywords and seniority in the Job Description.
2. Compare the Current CV against the Job Description.
3. Write the new CV so that it:
   - uses the template's HTML/CSS structure (or a faithful HTML/CSS recreation of a non-HTML template);
   - keeps all styling, colours, fonts, layouts, classes, IDs and responsive rules;
   - orders sections by relevance to the job, most relevant experience and skills first;
   - rewrites bullet points with the job description's keywords, using exact keyword matches where truthful;
   - stays readable by ATS scanners (standard headings, plain bullet lists) while keeping the template's look;
   - never invents experience: existing experience is reframed, not fabricated;
   - makes every email, LinkedIn profile, portfolio and other link clickable through an <a> tag with a valid href, adding target="_blank" and rel="noopener noreferrer" on web links and keeping the template's link styling.
4. Score from 0 to 100 how well the optimized CV matches the Job Description. Integrate keywords and prioritise sections thoroughly enough to reach 90 or higher.
5. Briefly explain what was changed and why.

The `htmlContent` field MUST hold the complete HTML document as a plain string, ready to save as an .html file. Do not wrap it in markdown code fences."#;

pub const TEMPLATE_DOCUMENT_LABEL: &str = "\n\n--- TEMPLATE CV (DOCUMENT) ---";
pub const TEMPLATE_TEXT_LABEL: &str = "\n\n--- TEMPLATE CV (TEXT/HTML) ---\n";
pub const CURRENT_CV_PDF_LABEL: &str = "\n\n--- CURRENT CV (PDF) ---";
pub const CURRENT_CV_TEXT_LABEL: &str = "\n\n--- CURRENT CV (TEXT) ---\n";
pub const JOB_DESCRIPTION_LABEL: &str = "\n\n--- JOB DESCRIPTION ---\n";

/// Response schema: exactly `htmlContent`, `matchScore`, `explanation`, all required.
pub fn generation_response_schema() -> Value {
    required_object_schema(&[
        SchemaField {
            name: "htmlContent",
            kind: SchemaType::String,
            description: "The complete, valid HTML document of the generated CV, including all original CSS and structure.",
        },
        SchemaField {
            name: "matchScore",
            kind: SchemaType::Number,
            description: "A score from 0 to 100 indicating how well the CV matches the job description.",
        },
        SchemaField {
            name: "explanation",
            kind: SchemaType::String,
            description: "A brief explanation of the optimizations made to the CV.",
        },
    ])
}
