//! Styled markup rendering of scanned markdown
//!
//! Produces an HTML-compatible fragment. Styling (heading sizes, justified
//! paragraphs, code and link appearance) is carried by the stylesheet of the
//! document the fragment is embedded in.

use super::blocks::{scan, Block, Inline, ListKind};

/// Convert markdown to a styled markup fragment
pub fn to_styled_markup(markdown: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for block in scan(markdown) {
        match block {
            Block::Heading { level, content } => {
                let n = level.number();
                parts.push(format!("<h{}>{}</h{}>", n, inline_markup(&content), n));
            }
            Block::Paragraph(lines) => {
                let body: Vec<String> = lines.iter().map(|line| inline_markup(line)).collect();
                parts.push(format!("<p>{}</p>", body.join("<br>")));
            }
            Block::List { kind, items } => {
                let tag = match kind {
                    ListKind::Unordered => "ul",
                    ListKind::Ordered => "ol",
                };
                let mut list = format!("<{}>\n", tag);
                for item in items {
                    list.push_str(&format!("<li>{}</li>\n", inline_markup(&item.content)));
                }
                list.push_str(&format!("</{}>", tag));
                parts.push(list);
            }
            Block::Break => {}
        }
    }

    parts.join("\n")
}

/// Render inline spans as markup
pub fn inline_markup(spans: &[Inline]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Inline::Text(text) => out.push_str(&escape_html(text)),
            Inline::Strong(inner) => {
                out.push_str("<strong>");
                out.push_str(&inline_markup(inner));
                out.push_str("</strong>");
            }
            Inline::Emphasis(inner) => {
                out.push_str("<em>");
                out.push_str(&inline_markup(inner));
                out.push_str("</em>");
            }
            Inline::Code(code) => {
                out.push_str("<code>");
                out.push_str(&escape_html(code));
                out.push_str("</code>");
            }
            Inline::Link { label, url } => {
                out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(url),
                    escape_html(label)
                ));
            }
        }
    }
    out
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
