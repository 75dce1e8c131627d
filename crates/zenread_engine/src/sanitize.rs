//! Allowlist HTML sanitizer for extracted article bodies.
//!
//! Readability output is third-party markup that ends up rendered verbatim
//! in the reader view, so it is re-serialized here keeping only structural
//! and typographic elements.

use ego_tree::NodeRef;
use scraper::node::{Element, Node};
use scraper::Html;

/// Elements kept (with their children).
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "cite", "code", "dd", "del", "details",
    "div", "dl", "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "i", "img", "ins", "kbd", "li", "mark", "ol", "p", "picture", "pre", "q", "s", "section",
    "small", "source", "span", "strong", "sub", "summary", "sup", "table", "tbody", "td",
    "tfoot", "th", "thead", "time", "tr", "u", "ul",
];

/// Elements removed together with everything inside them.
const DROPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "frame", "frameset", "object",
    "embed", "applet", "form", "input", "button", "select", "option", "textarea", "link",
    "meta", "base", "svg", "math", "canvas", "audio", "video",
];

const ALLOWED_ATTRS: &[&str] = &[
    "href", "src", "srcset", "alt", "title", "width", "height", "colspan", "rowspan",
    "datetime", "cite", "lang", "dir",
];

const URL_ATTRS: &[&str] = &["href", "src", "cite"];

const VOID_TAGS: &[&str] = &["br", "hr", "img", "source"];

/// Re-serialize `html` keeping only allowlisted tags and attributes.
///
/// Unknown wrapper elements are unwrapped (children kept), dangerous ones
/// are dropped with their contents.
pub fn sanitize_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    for child in fragment.root_element().children() {
        write_node(child, &mut out);
    }
    out.trim().to_string()
}

fn write_node(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => escape_text(text, out),
        Node::Element(element) => write_element(node, element, out),
        // comments, doctypes and processing instructions are dropped
        _ => {}
    }
}

fn write_element(node: NodeRef<'_, Node>, element: &Element, out: &mut String) {
    let name = element.name().to_ascii_lowercase();
    if DROPPED_TAGS.contains(&name.as_str()) {
        return;
    }
    if !ALLOWED_TAGS.contains(&name.as_str()) {
        for child in node.children() {
            write_node(child, out);
        }
        return;
    }

    out.push('<');
    out.push_str(&name);
    // Attributes come out in allowlist order, whatever order the source used.
    for &attr in ALLOWED_ATTRS {
        let Some(value) = element.attr(attr) else {
            continue;
        };
        if URL_ATTRS.contains(&attr) && !is_safe_url(value) {
            continue;
        }
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        escape_attr(value, out);
        out.push('"');
    }
    if name == "a" && element.attr("href").is_some_and(is_safe_url) {
        out.push_str(" rel=\"noopener noreferrer\"");
    }
    out.push('>');

    if VOID_TAGS.contains(&name.as_str()) {
        return;
    }
    for child in node.children() {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

fn is_safe_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    !(compact.starts_with("javascript:")
        || compact.starts_with("vbscript:")
        || compact.starts_with("data:"))
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}
