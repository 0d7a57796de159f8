//! Detects emails, absolute URLs and bare profile domains in plain text.
//!
//! Works on decoded text. Escaping happens when the segments are written back into a document.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Email,
    Url,
    /// `www.`, `linkedin.com/in/`, `github.com/` without a scheme.
    BareDomain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link {
        label: String,
        href: String,
        kind: LinkKind,
    },
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?i)(?P<url>\bhttps?://[^\s<>"']+)|(?P<email>\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b)|(?P<bare>\b(?:www\.|linkedin\.com/in/|github\.com/)[^\s<>"']+)"#,
        )
        .expect("static regex must compile")
    })
}

/// Splits `text` into literal text and link segments, in order.
/// Returns a single `Text` segment (or none for empty input) when nothing matches.
pub fn split_links(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in link_re().captures_iter(text) {
        let (m, kind) = if let Some(m) = caps.name("url") {
            (m, LinkKind::Url)
        } else if let Some(m) = caps.name("email") {
            (m, LinkKind::Email)
        } else if let Some(m) = caps.name("bare") {
            (m, LinkKind::BareDomain)
        } else {
            continue;
        };

        let label = trim_trailing_punctuation(m.as_str());
        if !is_meaningful(label, kind) {
            continue;
        }

        if m.start() > cursor {
            segments.push(Segment::Text(text[cursor..m.start()].to_string()));
        }
        segments.push(Segment::Link {
            label: label.to_string(),
            href: href_for(label, kind),
            kind,
        });
        cursor = m.start() + label.len();
    }

    if cursor < text.len() {
        segments.push(Segment::Text(text[cursor..].to_string()));
    }
    segments
}

pub fn has_links(segments: &[Segment]) -> bool {
    segments.iter().any(|s| matches!(s, Segment::Link { .. }))
}

fn href_for(label: &str, kind: LinkKind) -> String {
    match kind {
        LinkKind::Email => format!("mailto:{label}"),
        LinkKind::Url => label.to_string(),
        LinkKind::BareDomain => format!("https://{label}"),
    }
}

/// Drops sentence punctuation, and closing brackets without a matching opener.
fn trim_trailing_punctuation(candidate: &str) -> &str {
    let mut end = candidate.len();
    loop {
        let current = &candidate[..end];
        let Some(last) = current.chars().last() else {
            break;
        };
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' => true,
            ')' => current.matches('(').count() < current.matches(')').count(),
            ']' => current.matches('[').count() < current.matches(']').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        end -= last.len_utf8();
    }
    &candidate[..end]
}

fn is_meaningful(label: &str, kind: LinkKind) -> bool {
    let lower = label.to_ascii_lowercase();
    match kind {
        LinkKind::Email => true,
        LinkKind::Url => lower
            .split_once("://")
            .is_some_and(|(_, rest)| !rest.is_empty()),
        LinkKind::BareDomain => ["www.", "linkedin.com/in/", "github.com/"]
            .iter()
            .any(|prefix| lower.len() > prefix.len() && lower.starts_with(prefix)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(label: &str, href: &str, kind: LinkKind) -> Segment {
        Segment::Link {
            label: label.into(),
            href: href.into(),
            kind,
        }
    }

    fn text(s: &str) -> Segment {
        Segment::Text(s.into())
    }

    #[test]
    fn test_email_and_url() {
        let segments = split_links("Reach me at a@b.com or https://x.com");
        assert_eq!(
            segments,
            vec![
                text("Reach me at "),
                link("a@b.com", "mailto:a@b.com", LinkKind::Email),
                text(" or "),
                link("https://x.com", "https://x.com", LinkKind::Url),
            ]
        );
    }

    #[test]
    fn test_bare_domains_get_https() {
        let segments = split_links("linkedin.com/in/jane | github.com/jane | www.jane.dev");
        let hrefs: Vec<&str> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Link { href, .. } => Some(href.as_str()),
                Segment::Text(_) => None,
            })
            .collect();
        assert_eq!(
            hrefs,
            vec![
                "https://linkedin.com/in/jane",
                "https://github.com/jane",
                "https://www.jane.dev"
            ]
        );
    }

    #[test]
    fn test_prefixed_profile_url_is_one_link() {
        let segments = split_links("https://www.linkedin.com/in/jane");
        assert_eq!(
            segments,
            vec![link(
                "https://www.linkedin.com/in/jane",
                "https://www.linkedin.com/in/jane",
                LinkKind::Url
            )]
        );
    }

    #[test]
    fn test_trailing_punctuation_stays_text() {
        let segments = split_links("Mail jane@doe.io. See https://doe.io/cv, thanks");
        assert_eq!(
            segments,
            vec![
                text("Mail "),
                link("jane@doe.io", "mailto:jane@doe.io", LinkKind::Email),
                text(". See "),
                link("https://doe.io/cv", "https://doe.io/cv", LinkKind::Url),
                text(", thanks"),
            ]
        );
    }

    #[test]
    fn test_balanced_parentheses_are_kept() {
        let segments =
            split_links("(see https://en.wikipedia.org/wiki/Rust_(programming_language))");
        assert!(segments.contains(&link(
            "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            LinkKind::Url
        )));
        assert_eq!(segments.last(), Some(&text(")")));
    }

    #[test]
    fn test_plain_text_is_single_segment() {
        let segments = split_links("Senior engineer, 8 years");
        assert_eq!(segments, vec![text("Senior engineer, 8 years")]);
        assert!(!has_links(&segments));
        assert!(split_links("").is_empty());
    }

    #[test]
    fn test_bare_scheme_is_not_a_link() {
        assert!(!has_links(&split_links("use https:// for everything")));
    }
}
