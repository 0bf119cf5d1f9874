//! Selene Notebook - summary export and history core
//!
//! Library side of the notebook: everything needed to turn a generated
//! summary into plain text, a styled document or paginated pages, edit it
//! paragraph by paragraph, and keep a bounded history of saved summaries.
//! Network access and user interface live with the host.

pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod layout;
pub mod markdown;
pub mod paragraph;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use export::{ArtifactSink, ExportCoordinator, ExportFormat};
pub use history::{HistoryStore, KeyValueStore, NewSummary, SummaryRecord};
pub use layout::{PageLayoutEngine, RenderedPage};
pub use markdown::{to_plain_text, to_styled_markup};
pub use paragraph::{join, segment, Paragraphs, PostProcessOp, TextTransform};
