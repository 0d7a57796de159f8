//! Preview transform: makes a generated CV readable inside a narrow preview frame.
//!
//! Applies to the in-app preview only. Downloads always use the untouched document.

use std::sync::OnceLock;

use regex::Regex;

pub const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#;

/// Marker id of the injected style block; its presence makes the transform a no-op.
const RESPONSIVE_STYLE_ID: &str = "cv-matcher-responsive";

const RESPONSIVE_CSS: &str = r#"
@media (max-width: 768px) {
  html, body {
    width: 100% !important;
    max-width: 100% !important;
    margin: 0 !important;
    overflow-x: hidden !important;
    font-size: 16px !important;
  }
  body * {
    max-width: 100% !important;
    box-sizing: border-box !important;
  }
  body > *, main, .container, .page, .wrapper, .cv, .resume {
    width: 100% !important;
    padding-left: 12px !important;
    padding-right: 12px !important;
  }
  p, li, td, th, span, a { font-size: 15px !important; line-height: 1.5 !important; }
  h1 { font-size: 26px !important; }
  h2 { font-size: 20px !important; }
  h3 { font-size: 17px !important; }
  [style*="display: flex"], [style*="display:flex"], .flex, .row, .columns {
    flex-direction: column !important;
    flex-wrap: wrap !important;
  }
  [style*="display: grid"], [style*="display:grid"], .grid {
    grid-template-columns: 1fr !important;
  }
  table, thead, tbody, tr, td, th {
    display: block !important;
    width: 100% !important;
  }
  img { height: auto !important; }
}
"#;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex must compile"))
}

fn viewport_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"(?i)<meta\b[^>]*\bname\s*=\s*["']?viewport\b"#)
}

fn head_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)</head\s*>")
}

fn head_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)<head\b[^>]*>")
}

fn body_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)<body\b[^>]*>")
}

/// Adds a viewport meta tag (when missing) and the responsive override block.
pub fn preview_document(html: &str) -> String {
    let mut fragment = String::new();
    if !viewport_re().is_match(html) {
        fragment.push_str(VIEWPORT_META);
    }
    if !html.contains(RESPONSIVE_STYLE_ID) {
        fragment.push_str(&format!(
            r#"<style id="{RESPONSIVE_STYLE_ID}">{RESPONSIVE_CSS}</style>"#
        ));
    }
    if fragment.is_empty() {
        return html.to_string();
    }
    inject_into_head(html, &fragment)
}

/// Inserts `fragment` at the end of `<head>` if present, else before `<body>`, else prepends it.
pub fn inject_into_head(html: &str, fragment: &str) -> String {
    let position = head_close_re()
        .find(html)
        .map(|m| m.start())
        .or_else(|| head_open_re().find(html).map(|m| m.end()))
        .or_else(|| body_open_re().find(html).map(|m| m.start()));

    match position {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + fragment.len());
            out.push_str(&html[..at]);
            out.push_str(fragment);
            out.push_str(&html[at..]);
            out
        }
        None => format!("{fragment}{html}"),
    }
}
