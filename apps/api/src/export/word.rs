//! Word export: a tree transform over the parsed document, serialized as legacy Word HTML.

use html5ever::{LocalName, Namespace, QualName};
use kuchikiki::traits::TendrilSink;
use kuchikiki::{Attribute, ExpandedName, NodeRef};

use super::linkify::{has_links, split_links, Segment};
use super::ExportError;

pub const WORD_MIME: &str = "application/msword";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

const ANCHOR_STYLE: &str = "color: #0563C1; text-decoration: underline;";

const WORD_NAMESPACES: [(&str, &str); 3] = [
    ("xmlns:o", "urn:schemas-microsoft-com:office:office"),
    ("xmlns:w", "urn:schemas-microsoft-com:office:word"),
    ("xmlns", "http://www.w3.org/TR/REC-html40"),
];

/// Text inside these elements is never linkified.
const SKIPPED_PARENTS: [&str; 4] = ["a", "style", "script", "title"];

/// Converts a generated CV into a BOM-prefixed Word HTML document.
pub fn word_document(html: &str) -> Result<Vec<u8>, ExportError> {
    let document = kuchikiki::parse_html().one(html);

    add_word_namespaces(&document);
    ensure_charset_meta(&document);
    style_existing_anchors(&document);
    linkify_text_nodes(&document);

    let mut out = UTF8_BOM.to_vec();
    document.serialize(&mut out)?;
    Ok(out)
}

fn add_word_namespaces(document: &NodeRef) {
    if let Ok(root) = document.select_first("html") {
        let mut attributes = root.attributes.borrow_mut();
        for (name, value) in WORD_NAMESPACES {
            attributes.insert(name, value.to_string());
        }
    }
}

fn ensure_charset_meta(document: &NodeRef) {
    if document.select_first("meta[charset]").is_ok() {
        return;
    }
    if let Ok(head) = document.select_first("head") {
        head.as_node()
            .prepend(element("meta", &[("charset", "utf-8")]));
    }
}

fn style_existing_anchors(document: &NodeRef) {
    let Ok(anchors) = document.select("a") else {
        return;
    };
    for anchor in anchors {
        let mut attributes = anchor.attributes.borrow_mut();
        let style = match attributes.get("style") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{}; {ANCHOR_STYLE}", existing.trim().trim_end_matches(';'))
            }
            _ => ANCHOR_STYLE.to_string(),
        };
        attributes.insert("style", style);
    }
}

fn linkify_text_nodes(document: &NodeRef) {
    // Collected up front: the tree is rewritten while walking the list.
    let candidates: Vec<NodeRef> = document
        .descendants()
        .filter(|node| node.as_text().is_some() && !inside_skipped_element(node))
        .collect();

    for node in candidates {
        let Some(text) = node.as_text().map(|t| t.borrow().clone()) else {
            continue;
        };
        let segments = split_links(&text);
        if !has_links(&segments) {
            continue;
        }
        for segment in segments {
            let replacement = match segment {
                Segment::Text(literal) => NodeRef::new_text(literal),
                Segment::Link { label, href, .. } => {
                    let anchor = element("a", &[("href", &href), ("style", ANCHOR_STYLE)]);
                    anchor.append(NodeRef::new_text(label));
                    anchor
                }
            };
            node.insert_before(replacement);
        }
        node.detach();
    }
}

fn inside_skipped_element(node: &NodeRef) -> bool {
    node.ancestors().any(|ancestor| {
        ancestor
            .as_element()
            .is_some_and(|el| SKIPPED_PARENTS.contains(&&*el.name.local))
    })
}

fn element(name: &str, attrs: &[(&str, &str)]) -> NodeRef {
    let node = NodeRef::new_element(
        QualName::new(None, Namespace::from(XHTML_NS), LocalName::from(name)),
        std::iter::empty::<(ExpandedName, Attribute)>(),
    );
    if let Some(data) = node.as_element() {
        let mut attributes = data.attributes.borrow_mut();
        for (key, value) in attrs {
            attributes.insert(*key, value.to_string());
        }
    }
    node
}
