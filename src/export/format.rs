//! Export formats, menu choices and artifact naming

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ExportError;
use crate::utils::time;

/// Characters that cannot appear in a portable file name
static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f]"#).expect("file name pattern is valid"));

/// Format requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Plain text with markdown structure flattened
    Plain,
    /// Word-compatible styled document
    Rich,
    /// Paginated page layout
    PageLayout,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Plain, ExportFormat::Rich, ExportFormat::PageLayout];

    /// Short identifier reported back to callers
    pub fn id(&self) -> &'static str {
        match self {
            ExportFormat::Plain => "txt",
            ExportFormat::Rich => "docx",
            ExportFormat::PageLayout => "pdf",
        }
    }

    /// Menu label for the format
    pub fn display_name(&self) -> &'static str {
        match self {
            ExportFormat::Plain => "Export as TXT",
            ExportFormat::Rich => "Export as Word Document",
            ExportFormat::PageLayout => "Export as PDF",
        }
    }

    /// Artifact produced when rendering succeeds
    pub fn primary_kind(&self) -> ArtifactKind {
        match self {
            ExportFormat::Plain => ArtifactKind::PlainText,
            ExportFormat::Rich => ArtifactKind::RichDocument,
            ExportFormat::PageLayout => ArtifactKind::PageLayout,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "txt" | "text" => Ok(ExportFormat::Plain),
            "rich" | "doc" | "docx" | "word" => Ok(ExportFormat::Rich),
            "page-layout" | "page" | "pdf" => Ok(ExportFormat::PageLayout),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Concrete artifact type handed to the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    PlainText,
    RichDocument,
    PageLayout,
    /// Printable styled document used when page layout is unavailable
    PrintReady,
}

impl ArtifactKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::PlainText => "txt",
            ArtifactKind::RichDocument => "doc",
            ArtifactKind::PageLayout => "pdf",
            ArtifactKind::PrintReady => "html",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ArtifactKind::PlainText => "text/plain;charset=utf-8",
            ArtifactKind::RichDocument => "application/msword;charset=utf-8",
            ArtifactKind::PageLayout => "application/pdf",
            ArtifactKind::PrintReady => "text/html;charset=utf-8",
        }
    }
}

/// Entry of the export menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportChoice {
    Format(ExportFormat),
    Cancel,
}

impl ExportChoice {
    pub fn label(&self) -> &'static str {
        match self {
            ExportChoice::Format(format) => format.display_name(),
            ExportChoice::Cancel => "Cancel",
        }
    }

    /// Every menu entry: the three formats, then cancel
    pub fn menu() -> [ExportChoice; 4] {
        [
            ExportChoice::Format(ExportFormat::Plain),
            ExportChoice::Format(ExportFormat::Rich),
            ExportChoice::Format(ExportFormat::PageLayout),
            ExportChoice::Cancel,
        ]
    }
}

/// Presents the export menu and returns the user's pick
pub trait FormatChooser: Send + Sync {
    fn choose(&self, options: &[ExportChoice]) -> ExportChoice;
}

/// Chooser that always answers the same way
#[derive(Debug, Clone, Copy)]
pub struct FixedChoice(pub ExportChoice);

impl FormatChooser for FixedChoice {
    fn choose(&self, _options: &[ExportChoice]) -> ExportChoice {
        self.0
    }
}

/// `<base>_<YYYY-MM-DDTHH-MM-SS>.<ext>` with unsafe characters replaced and
/// leading dots removed
pub fn generate_filename(base_name: &str, extension: &str, at: DateTime<Utc>) -> String {
    let base = UNSAFE_FILENAME_CHARS.replace_all(base_name.trim(), "-");
    let base = base.trim_start_matches('.');
    let base = if base.is_empty() { "export" } else { base };
    format!("{}_{}.{}", base, time::filename_timestamp(at), extension)
}
