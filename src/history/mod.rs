//! History module for Selene Notebook
//!
//! Keeps the bounded log of saved summaries:
//! - Summary records and their persisted JSON layout
//! - Key-value persistence backends (memory, file)
//! - The newest-first history store with FIFO eviction

pub mod record;
pub mod storage;
pub mod store;

pub use record::{NewSummary, SummaryRecord, PREVIEW_CHARS};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::HistoryStore;
