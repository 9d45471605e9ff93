// src/fetch/normalize.rs

//! Reduce a response body to a representation that only changes when the
//! page's content or structure does.
//!
//! For HTML we walk the `<body>` element (or the whole document when there
//! is none) and emit one token per element and per text run:
//!
//! - elements as `<name a="1" b="2">`, attributes sorted, values
//!   whitespace-collapsed;
//! - text runs whitespace-collapsed, empty runs dropped;
//! - `script`, `style`, `noscript` and `template` subtrees, comments and
//!   `nonce` attributes are skipped.

use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};

const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];
const SKIPPED_ATTRIBUTES: [&str; 1] = ["nonce"];

/// Pick a normalization based on the response content type.
///
/// A missing content type is treated as HTML.
pub fn normalize_body(body: &str, content_type: Option<&str>) -> String {
    let is_html = content_type
        .map(|ct| {
            let ct = ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase();
            ct == "text/html" || ct == "application/xhtml+xml"
        })
        .unwrap_or(true);

    if is_html {
        normalize_html(body)
    } else {
        normalize_text(body)
    }
}

pub fn normalize_html(html: &str) -> String {
    let doc = Html::parse_document(html);
    let body_sel = Selector::parse("body").ok();

    let root = body_sel
        .as_ref()
        .and_then(|sel| doc.select(sel).next())
        .unwrap_or_else(|| doc.root_element());

    let mut out = String::new();
    walk(*root, &mut out);
    out
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn walk(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(element) => {
            let name = element.name();
            if SKIPPED_ELEMENTS.contains(&name) {
                return;
            }

            let mut attrs: Vec<(&str, &str)> = element
                .attrs()
                .filter(|(key, _)| !SKIPPED_ATTRIBUTES.contains(key))
                .collect();
            attrs.sort_unstable();

            out.push('<');
            out.push_str(name);
            for (key, value) in attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&normalize_text(value));
                out.push('"');
            }
            out.push_str(">\n");

            for child in node.children() {
                walk(child, out);
            }

            out.push_str("</");
            out.push_str(name);
            out.push_str(">\n");
        }
        Node::Text(text) => {
            let collapsed = normalize_text(text);
            if !collapsed.is_empty() {
                out.push_str(&collapsed);
                out.push('\n');
            }
        }
        _ => {}
    }
}
