//! Markdown module for Selene Notebook
//!
//! Handles the restricted markdown subset used by generated summaries:
//! - Block scanning (headings, paragraphs, flat lists)
//! - Inline tokenization (bold, italic, code, links)
//! - Plain-text rendering
//! - Styled markup rendering

pub mod blocks;
pub mod plain;
pub mod styled;

pub use blocks::{scan, Block, HeadingLevel, Inline, ListItem, ListKind};
pub use plain::to_plain_text;
pub use styled::{escape_html, to_styled_markup};
