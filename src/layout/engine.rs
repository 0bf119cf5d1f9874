//! Page layout engine
//!
//! Places the markdown subset onto fixed-size pages as a top-to-bottom
//! sequence of text blocks. A block is never split across a page boundary:
//! when the next block would run past the printable bottom, a new page is
//! started first.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::measure::{wrap_text, HelveticaMetrics, TextMeasure};
use crate::config::{BlockStyle, LayoutConfig, PageConfig};
use crate::markdown::{blocks::parse_heading, HeadingLevel};

static BOLD_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));

static ITALIC_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("italic pattern is valid"));

/// Kind of a laid-out block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Body,
}

impl BlockKind {
    pub fn is_heading(&self) -> bool {
        !matches!(self, BlockKind::Body)
    }
}

impl From<HeadingLevel> for BlockKind {
    fn from(level: HeadingLevel) -> Self {
        match level {
            HeadingLevel::H1 => BlockKind::Heading1,
            HeadingLevel::H2 => BlockKind::Heading2,
            HeadingLevel::H3 => BlockKind::Heading3,
        }
    }
}

/// A positioned block of wrapped text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBlock {
    pub kind: BlockKind,
    /// Wrapped display lines
    pub lines: Vec<String>,
    /// Font size the lines were measured at, in points
    pub font_size: f32,
    /// Height of one line in millimetres
    pub line_height: f32,
    /// Distance of the block's top edge from the top of the page
    pub y: f32,
    /// Vertical extent consumed by the block
    pub height: f32,
}

impl LayoutBlock {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// One fixed-size page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    /// 1-based page number
    pub number: usize,
    pub blocks: Vec<LayoutBlock>,
}

/// Title and metadata line placed before the document body
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutHeader {
    pub title: String,
    pub meta: String,
}

/// Lays markdown out onto pages
#[derive(Clone)]
pub struct PageLayoutEngine {
    config: LayoutConfig,
    measure: Arc<dyn TextMeasure>,
    header: Option<LayoutHeader>,
}

impl std::fmt::Debug for PageLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageLayoutEngine")
            .field("config", &self.config)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl PageLayoutEngine {
    /// Create an engine with the built-in Helvetica metrics
    pub fn new(config: LayoutConfig) -> Self {
        Self::with_measure(config, Arc::new(HelveticaMetrics))
    }

    /// Create an engine using a host-supplied measurement function
    pub fn with_measure(config: LayoutConfig, measure: Arc<dyn TextMeasure>) -> Self {
        Self {
            config,
            measure,
            header: None,
        }
    }

    /// Place a title and metadata line at the top of the first page
    pub fn with_header(mut self, header: LayoutHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Style for `kind`, with the line height capped at the printable page
    /// height so a single line always fits on a page
    fn style(&self, kind: BlockKind) -> BlockStyle {
        let mut style = match kind {
            BlockKind::Heading1 => self.config.heading1,
            BlockKind::Heading2 => self.config.heading2,
            BlockKind::Heading3 => self.config.heading3,
            BlockKind::Body => self.config.body,
        };
        let limit = self.config.page.printable_height();
        if style.line_height > limit {
            style.line_height = limit.max(0.0);
        }
        style
    }

    /// Lay out a markdown document.
    ///
    /// Always returns at least one page.
    pub fn layout(&self, markdown: &str) -> Vec<RenderedPage> {
        let mut pager = Pager::new(self.config.page);

        if let Some(header) = &self.header {
            self.place(&mut pager, BlockKind::Heading1, &header.title);
            self.place(&mut pager, BlockKind::Body, &header.meta);
        }

        for raw in markdown.lines() {
            let line = raw.trim();
            if line.is_empty() {
                pager.advance(self.config.blank_line_gap);
                continue;
            }

            match parse_heading(line) {
                Some((level, text)) => self.place(&mut pager, level.into(), text),
                None => self.place(&mut pager, BlockKind::Body, &strip_emphasis(line)),
            }
        }

        let pages = pager.finish();
        log::debug!(
            "Laid out {} bytes of markdown onto {} page(s)",
            markdown.len(),
            pages.len()
        );
        pages
    }

    fn place(&self, pager: &mut Pager, kind: BlockKind, text: &str) {
        let style = self.style(kind);
        let lines = wrap_text(
            self.measure.as_ref(),
            text,
            style.font_size,
            self.config.page.content_width(),
        );
        pager.place(kind, lines, style);
    }
}

/// Remove bold and italic markers, keeping their content
pub fn strip_emphasis(line: &str) -> String {
    let without_bold = BOLD_MARKERS.replace_all(line, "$1");
    ITALIC_MARKERS.replace_all(&without_bold, "$1").into_owned()
}

/// Vertical cursor over a sequence of pages
struct Pager {
    page: PageConfig,
    pages: Vec<RenderedPage>,
    current: Vec<LayoutBlock>,
    cursor: f32,
}

impl Pager {
    fn new(page: PageConfig) -> Self {
        Self {
            page,
            pages: Vec::new(),
            current: Vec::new(),
            cursor: page.margin,
        }
    }

    fn advance(&mut self, gap: f32) {
        self.cursor += gap;
    }

    fn break_page(&mut self) {
        if !self.current.is_empty() {
            let number = self.pages.len() + 1;
            self.pages.push(RenderedPage {
                number,
                blocks: std::mem::take(&mut self.current),
            });
        }
        self.cursor = self.page.margin;
    }

    /// Place a block, splitting it at line boundaries only when it is taller
    /// than a whole page
    fn place(&mut self, kind: BlockKind, lines: Vec<String>, style: BlockStyle) {
        let per_page = (self.page.printable_height() / style.line_height).floor().max(1.0) as usize;

        let mut remaining = lines;
        while remaining.len() > per_page {
            let rest = remaining.split_off(per_page);
            self.place_chunk(kind, remaining, style, 0.0);
            remaining = rest;
        }
        self.place_chunk(kind, remaining, style, style.spacing_after);
    }

    fn place_chunk(&mut self, kind: BlockKind, lines: Vec<String>, style: BlockStyle, spacing_after: f32) {
        let height = lines.len() as f32 * style.line_height;
        if self.cursor + height > self.page.printable_bottom() {
            self.break_page();
        }

        self.current.push(LayoutBlock {
            kind,
            lines,
            font_size: style.font_size,
            line_height: style.line_height,
            y: self.cursor,
            height,
        });
        self.cursor += height + spacing_after;
    }

    fn finish(mut self) -> Vec<RenderedPage> {
        if !self.current.is_empty() || self.pages.is_empty() {
            let number = self.pages.len() + 1;
            self.pages.push(RenderedPage {
                number,
                blocks: std::mem::take(&mut self.current),
            });
        }
        self.pages
    }
}
