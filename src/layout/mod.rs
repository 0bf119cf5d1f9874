//! Page layout module for Selene Notebook
//!
//! Simulates a document layout engine without a rendering surface:
//! - Text measurement through a host-supplied capability
//! - Word wrapping to the printable width
//! - Pagination that never splits a block across pages
//! - A lazily loaded backend turning pages into a PDF artifact

pub mod engine;
pub mod measure;
pub mod pdf;

pub use engine::{strip_emphasis, BlockKind, LayoutBlock, LayoutHeader, PageLayoutEngine, RenderedPage};
pub use measure::{wrap_text, HelveticaMetrics, TextMeasure, MM_TO_PT, PT_TO_MM};
pub use pdf::{BackendLoader, BuiltinPdfLoader, DocumentInfo, LayoutBackend, LazyBackend, PdfWriter};
