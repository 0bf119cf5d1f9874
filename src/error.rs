//! Error types for Selene Notebook
//!
//! This module defines all custom error types used throughout the crate.
//! Error types are organized by category for clear error handling and user-friendly messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Key-value persistence errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Paragraph editing errors
    #[error(transparent)]
    Segment(#[from] SegmentError),

    /// Export errors
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error saving configuration
    #[error("Could not save configuration: {0}")]
    SaveError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Errors raised by a key-value persistence backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend cannot be reached at all
    #[error("Storage is unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the write because it is full
    #[error("Storage quota exceeded for key {key}")]
    QuotaExceeded { key: String },

    /// Error reading a stored value
    #[error("Could not read stored value: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a stored value
    #[error("Could not write stored value: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored payload could not be encoded or decoded
    #[error("Stored payload is not valid: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key contains characters the backend cannot map to a location
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Errors raised while editing a paragraph sequence
#[derive(Error, Debug)]
pub enum SegmentError {
    /// Paragraph index does not exist
    #[error("Paragraph index {index} is out of range (document has {len} paragraphs)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The external rewrite capability failed
    #[error("Paragraph transform failed: {0}")]
    Transform(#[source] TransformError),
}

/// Failure reported by an external text transform capability
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransformError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors raised by the page-layout artifact backend
#[derive(Error, Debug, Clone)]
pub enum LayoutError {
    /// Backend could not be initialized
    #[error("Layout backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend was initialized but failed to produce output
    #[error("Layout rendering failed: {0}")]
    RenderFailed(String),
}

/// Errors raised while exporting an artifact
#[derive(Error, Debug)]
pub enum ExportError {
    /// Rendering failed and no fallback could be produced
    #[error("Could not render {format} export: {reason}")]
    RenderFailed { format: String, reason: String },

    /// The host refused or failed to accept the artifact
    #[error("Could not deliver export {filename}: {reason}")]
    SinkFailed { filename: String, reason: String },

    /// I/O error while staging the artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Export format not supported
    #[error("Export format not supported: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for paragraph operations
pub type SegmentResult<T> = Result<T, SegmentError>;

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

impl ExportError {
    /// Create a user-friendly error message suitable for a failure notice
    pub fn user_message(&self) -> String {
        match self {
            ExportError::RenderFailed { .. } => {
                "The document could not be exported. Please try a different format.".to_string()
            }
            ExportError::SinkFailed { .. } | ExportError::Io(_) => {
                "The export could not be saved. Check disk space and permissions.".to_string()
            }
            ExportError::UnsupportedFormat(format) => {
                format!("Export as {} is not supported.", format)
            }
        }
    }
}

impl StorageError {
    /// Whether the failure indicates a full backend rather than a broken one
    pub fn is_quota(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_error_display() {
        let err = SegmentError::IndexOutOfRange { index: 4, len: 3 };
        assert!(err.to_string().contains("4"));
        assert!(err.to_string().contains("3 paragraphs"));
    }

    #[test]
    fn test_export_error_user_message() {
        let err = ExportError::SinkFailed {
            filename: "summary.txt".to_string(),
            reason: "disk full".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.contains("could not be saved"));
    }

    #[test]
    fn test_app_error_from_segment_error() {
        let err = SegmentError::IndexOutOfRange { index: 1, len: 0 };
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::Segment(_)));
    }

    #[test]
    fn test_app_error_is_transparent() {
        let err: AppError = ExportError::UnsupportedFormat("odt".to_string()).into();
        assert!(matches!(err, AppError::Export(_)));
        assert_eq!(err.to_string(), "Export format not supported: odt");

        let err: AppError = StorageError::InvalidKey("../x".to_string()).into();
        assert_eq!(err.to_string(), "Invalid storage key: ../x");
    }

    #[test]
    fn test_transform_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = TransformError::with_source("rewrite service failed", io);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "rewrite service failed");
    }
}
