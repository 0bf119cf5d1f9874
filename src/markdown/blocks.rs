//! Block scanner for the supported markdown subset
//!
//! The document is scanned once, left to right, into a flat sequence of
//! typed blocks. Both the plain-text and the styled renderers consume this
//! sequence, so heading, emphasis, list and paragraph rules never see each
//! other's output.

use once_cell::sync::Lazy;
use regex::Regex;

/// `<digits>. ` at the start of a line
static ORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\. ").expect("ordered list marker pattern is valid"));

/// Heading depth recognized by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn number(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Length of the `=` rule printed under the heading in plain text
    pub fn underline_len(&self) -> usize {
        match self {
            HeadingLevel::H1 => 40,
            HeadingLevel::H2 => 30,
            HeadingLevel::H3 => 20,
        }
    }
}

/// Split a heading line into its level and text.
///
/// Longest prefix first so `### x` is never read as a level-1 heading. A bare
/// `###` line (the paragraph sentinel) has no trailing space and is not a
/// heading.
pub fn parse_heading(line: &str) -> Option<(HeadingLevel, &str)> {
    if let Some(text) = line.strip_prefix("### ") {
        Some((HeadingLevel::H3, text))
    } else if let Some(text) = line.strip_prefix("## ") {
        Some((HeadingLevel::H2, text))
    } else {
        line.strip_prefix("# ").map(|text| (HeadingLevel::H1, text))
    }
}

/// Kind of list marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `* item`
    Unordered,
    /// `1. item`
    Ordered,
}

/// A single list line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Marker kind of this line (may differ from the enclosing run)
    pub kind: ListKind,
    /// Marker exactly as written, including the trailing space
    pub marker: String,
    pub content: Vec<Inline>,
}

/// Inline span inside a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Code(String),
    Link { label: String, url: String },
}

/// Block-level element produced by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: HeadingLevel,
        content: Vec<Inline>,
    },
    /// Consecutive text lines, each tokenized separately
    Paragraph(Vec<Vec<Inline>>),
    /// A contiguous run of list lines; `kind` comes from the first line
    List { kind: ListKind, items: Vec<ListItem> },
    /// One or more blank lines
    Break,
}

/// Classify a list line, returning `None` for anything else
pub fn parse_list_item(line: &str) -> Option<ListItem> {
    if let Some(text) = line.strip_prefix("* ") {
        return Some(ListItem {
            kind: ListKind::Unordered,
            marker: "* ".to_string(),
            content: parse_inline(text),
        });
    }

    ORDERED_MARKER.find(line).map(|m| ListItem {
        kind: ListKind::Ordered,
        marker: m.as_str().to_string(),
        content: parse_inline(&line[m.end()..]),
    })
}

/// Scan a markdown document into blocks.
///
/// Leading and trailing blank lines produce no `Break`, and a run of blank
/// lines produces exactly one.
pub fn scan(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<Vec<Inline>> = Vec::new();
    let mut list: Option<(ListKind, Vec<ListItem>)> = None;

    for line in markdown.lines() {
        if line.trim().is_empty() {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_list(&mut blocks, &mut list);
            if !blocks.is_empty() && blocks.last() != Some(&Block::Break) {
                blocks.push(Block::Break);
            }
            continue;
        }

        if let Some((level, text)) = parse_heading(line) {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_list(&mut blocks, &mut list);
            blocks.push(Block::Heading {
                level,
                content: parse_inline(text),
            });
            continue;
        }

        if let Some(item) = parse_list_item(line) {
            flush_paragraph(&mut blocks, &mut paragraph);
            let (_, items) = list.get_or_insert_with(|| (item.kind, Vec::new()));
            items.push(item);
            continue;
        }

        flush_list(&mut blocks, &mut list);
        paragraph.push(parse_inline(line));
    }

    flush_paragraph(&mut blocks, &mut paragraph);
    flush_list(&mut blocks, &mut list);

    if blocks.last() == Some(&Block::Break) {
        blocks.pop();
    }
    blocks
}

fn flush_paragraph(blocks: &mut Vec<Block>, paragraph: &mut Vec<Vec<Inline>>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph(std::mem::take(paragraph)));
    }
}

fn flush_list(blocks: &mut Vec<Block>, list: &mut Option<(ListKind, Vec<ListItem>)>) {
    if let Some((kind, items)) = list.take() {
        blocks.push(Block::List { kind, items });
    }
}

/// Tokenize one line into inline spans
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        let matched = match ch {
            '`' => code_span(rest),
            '*' => strong_emphasis_span(rest)
                .or_else(|| strong_span(rest))
                .or_else(|| emphasis_span(rest)),
            '[' => link_span(rest),
            _ => None,
        };

        match matched {
            Some((span, consumed)) => {
                if !plain.is_empty() {
                    spans.push(Inline::Text(std::mem::take(&mut plain)));
                }
                spans.push(span);
                rest = &rest[consumed..];
            }
            None => {
                plain.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    if !plain.is_empty() {
        spans.push(Inline::Text(plain));
    }
    spans
}

/// Emphasis content must hug its markers
fn is_emphasis_content(inner: &str) -> bool {
    let starts_tight = inner.chars().next().is_some_and(|c| !c.is_whitespace());
    let ends_tight = inner.chars().last().is_some_and(|c| !c.is_whitespace());
    starts_tight && ends_tight
}

fn code_span(s: &str) -> Option<(Inline, usize)> {
    let body = s.strip_prefix('`')?;
    let end = body.find('`')?;
    if end == 0 {
        return None;
    }
    Some((Inline::Code(body[..end].to_string()), end + 2))
}

/// `***x***`, read as emphasis inside strong
fn strong_emphasis_span(s: &str) -> Option<(Inline, usize)> {
    let body = s.strip_prefix("***")?;
    let end = body.find("***")?;
    let inner = &body[..end];
    if !is_emphasis_content(inner) {
        return None;
    }
    Some((
        Inline::Strong(vec![Inline::Emphasis(parse_inline(inner))]),
        end + 6,
    ))
}

fn strong_span(s: &str) -> Option<(Inline, usize)> {
    let body = s.strip_prefix("**")?;
    let end = body.find("**")?;
    let inner = &body[..end];
    if !is_emphasis_content(inner) {
        return None;
    }
    Some((Inline::Strong(parse_inline(inner)), end + 4))
}

fn emphasis_span(s: &str) -> Option<(Inline, usize)> {
    let body = s.strip_prefix('*')?;
    let end = body.find('*')?;
    let inner = &body[..end];
    if !is_emphasis_content(inner) {
        return None;
    }
    Some((Inline::Emphasis(parse_inline(inner)), end + 2))
}

fn link_span(s: &str) -> Option<(Inline, usize)> {
    let body = s.strip_prefix('[')?;
    let close = body.find(']')?;
    let label = &body[..close];
    let target = body[close + 1..].strip_prefix('(')?;
    let end = target.find(')')?;
    let url = &target[..end];
    if label.is_empty() || url.is_empty() {
        return None;
    }
    // '[' + label + "](" + url + ')'
    let consumed = 1 + close + 2 + end + 1;
    Some((
        Inline::Link {
            label: label.to_string(),
            url: url.to_string(),
        },
        consumed,
    ))
}
