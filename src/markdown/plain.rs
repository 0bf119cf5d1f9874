//! Plain-text rendering of scanned markdown

use super::blocks::{scan, Block, Inline, ListKind};

/// Convert markdown to plain text while preserving structure.
///
/// Headings are underlined with `=`, emphasis and code markers are removed,
/// links become `label (url)`, bullets become `• ` and numbered markers are
/// kept as written. `\r\n` line endings become `\n`, runs of blank lines
/// collapse to one and the result is trimmed.
pub fn to_plain_text(markdown: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for block in scan(markdown) {
        match block {
            Block::Heading { level, content } => {
                lines.push(inline_text(&content));
                lines.push("=".repeat(level.underline_len()));
            }
            Block::Paragraph(paragraph) => {
                lines.extend(paragraph.iter().map(|line| inline_text(line)));
            }
            Block::List { items, .. } => {
                for item in items {
                    let marker = match item.kind {
                        ListKind::Unordered => "• ",
                        ListKind::Ordered => item.marker.as_str(),
                    };
                    lines.push(format!("{}{}", marker, inline_text(&item.content)));
                }
            }
            Block::Break => lines.push(String::new()),
        }
    }

    lines.join("\n").trim().to_string()
}

/// Flatten inline spans to their visible text
pub fn inline_text(spans: &[Inline]) -> String {
    let mut out = String::new();
    push_inline_text(spans, &mut out);
    out
}

fn push_inline_text(spans: &[Inline], out: &mut String) {
    for span in spans {
        match span {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Strong(inner) | Inline::Emphasis(inner) => push_inline_text(inner, out),
            Inline::Link { label, url } => {
                out.push_str(label);
                out.push_str(" (");
                out.push_str(url);
                out.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_body() {
        assert_eq!(
            to_plain_text("# Title\n\nBody text."),
            format!("Title\n{}\n\nBody text.", "=".repeat(40))
        );
    }

    #[test]
    fn test_heading_underline_lengths() {
        let plain = to_plain_text("## Two\n### Three");
        let lines: Vec<&str> = plain.lines().collect();
        assert_eq!(lines[0], "Two");
        assert_eq!(lines[1].len(), 30);
        assert_eq!(lines[2], "Three");
        assert_eq!(lines[3].len(), 20);
    }

    #[test]
    fn test_inline_markers_removed() {
        assert_eq!(
            to_plain_text("Some **bold**, *italic* and `code`."),
            "Some bold, italic and code."
        );
    }

    #[test]
    fn test_bold_italic_removed() {
        assert_eq!(to_plain_text("***x***"), "x");
        assert_eq!(to_plain_text("a ***key point*** here"), "a key point here");
    }

    #[test]
    fn test_link_conversion() {
        assert_eq!(
            to_plain_text("Read [the docs](https://example.com) first"),
            "Read the docs (https://example.com) first"
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            to_plain_text("* apples\n* pears\n\n1. one\n10. ten"),
            "• apples\n• pears\n\n1. one\n10. ten"
        );
    }

    #[test]
    fn test_plain_input_unchanged_except_newlines() {
        let input = "Hello world.\nSecond line.\n\n\n\nNew paragraph here.";
        assert_eq!(
            to_plain_text(input),
            "Hello world.\nSecond line.\n\nNew paragraph here."
        );

        let already_plain = "Just a sentence, nothing else.";
        assert_eq!(to_plain_text(already_plain), already_plain);
    }

    #[test]
    fn test_crlf_line_endings_normalized() {
        assert_eq!(to_plain_text("a\r\nb"), "a\nb");
        assert_eq!(to_plain_text("a\r\n\r\n\r\nb"), "a\n\nb");
    }

    #[test]
    fn test_heading_without_blank_line() {
        assert_eq!(
            to_plain_text("# T\nbody"),
            format!("T\n{}\nbody", "=".repeat(40))
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(to_plain_text(""), "");
        assert_eq!(to_plain_text("\n\n\n"), "");
    }
}
