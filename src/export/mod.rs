//! Export module for Selene Notebook
//!
//! Produces downloadable artifacts from summary text:
//! - Plain text, Word-compatible rich documents and paginated PDFs
//! - Print-ready fallback when page layout is unavailable
//! - Timestamped artifact names
//! - Pluggable delivery through artifact sinks

pub mod coordinator;
pub mod format;
pub mod rich;
pub mod sink;

pub use coordinator::{Artifact, ChoiceOutcome, ExportCoordinator, ExportOutcome};
pub use format::{generate_filename, ArtifactKind, ExportChoice, ExportFormat, FixedChoice, FormatChooser};
pub use rich::{print_document, rich_document, DocumentHeader};
pub use sink::{ArtifactSink, DirectorySink, MemorySink, OfferOutcome, OfferedArtifact};
