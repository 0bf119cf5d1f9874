//! Configuration management for Selene Notebook
//!
//! Handles loading, saving, and managing configuration for the layout engine,
//! the summary history and the export coordinator.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier following reverse-DNS convention
pub const APP_ID: &str = "com.selene.Notebook";

/// Name of the configuration file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Reserved key holding the summary history
pub const HISTORY_STORAGE_KEY: &str = "selene_summary_history";

/// Maximum number of summaries kept in history
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// A4 page width in millimetres
pub const A4_WIDTH_MM: f32 = 210.0;

/// A4 page height in millimetres
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Default side margin in millimetres
pub const DEFAULT_PAGE_MARGIN_MM: f32 = 20.0;

/// Default base name for exported artifacts
pub const DEFAULT_EXPORT_BASE_NAME: &str = "ai-summary";

/// Title printed at the top of rich and page-layout exports
pub const DEFAULT_DOCUMENT_TITLE: &str = "AI Generated Summary";

/// Configuration root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page layout configuration
    pub layout: LayoutConfig,

    /// Summary history configuration
    pub history: HistoryConfig,

    /// Export configuration
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from the configuration directory or return defaults
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_dir()?.join(CONFIG_FILE_NAME);
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file, defaults when it does not exist
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the configuration directory
    pub fn save(&self) -> ConfigResult<()> {
        let path = Self::config_dir()?.join(CONFIG_FILE_NAME);
        self.save_to(&path)
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::SaveError(e.to_string()))
    }

    /// Reject values the layout engine and history cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        let page = &self.layout.page;
        if page.width <= page.margin * 2.0 {
            return Err(ConfigError::InvalidValue {
                key: "layout.page.width".to_string(),
                reason: "page width must exceed both side margins".to_string(),
            });
        }
        if page.height <= page.margin * 2.0 {
            return Err(ConfigError::InvalidValue {
                key: "layout.page.height".to_string(),
                reason: "page height must exceed top and bottom margins".to_string(),
            });
        }
        for (key, style) in self.layout.styles() {
            if !(style.line_height > 0.0 && style.line_height <= page.printable_height()) {
                return Err(ConfigError::InvalidValue {
                    key: format!("layout.{}.line_height", key),
                    reason: "line height must be positive and fit within the printable page height"
                        .to_string(),
                });
            }
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "history.capacity".to_string(),
                reason: "history must keep at least one entry".to_string(),
            });
        }
        if self.history.storage_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "history.storage_key".to_string(),
                reason: "storage key cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the data directory path (history store)
    pub fn data_dir() -> ConfigResult<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the directory holding the persisted key-value entries
    pub fn store_dir() -> ConfigResult<PathBuf> {
        Self::data_dir().map(|p| p.join("store"))
    }
}

/// Page geometry in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: f32,
    pub height: f32,
    /// Applied on every side
    pub margin: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: A4_WIDTH_MM,
            height: A4_HEIGHT_MM,
            margin: DEFAULT_PAGE_MARGIN_MM,
        }
    }
}

impl PageConfig {
    /// Width available to text between the side margins
    pub fn content_width(&self) -> f32 {
        self.width - self.margin * 2.0
    }

    /// Lowest y position a block may reach
    pub fn printable_bottom(&self) -> f32 {
        self.height - self.margin
    }

    /// Height available to blocks on a single page
    pub fn printable_height(&self) -> f32 {
        self.printable_bottom() - self.margin
    }
}

/// Font size and spacing for one block kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockStyle {
    /// Font size in points
    pub font_size: f32,
    /// Vertical extent of one wrapped line in millimetres
    pub line_height: f32,
    /// Gap left below the block in millimetres
    pub spacing_after: f32,
}

/// Page layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page: PageConfig,
    pub heading1: BlockStyle,
    pub heading2: BlockStyle,
    pub heading3: BlockStyle,
    pub body: BlockStyle,
    /// Cursor advance for a blank source line
    pub blank_line_gap: f32,
}

impl LayoutConfig {
    /// Every block style with its configuration key
    pub fn styles(&self) -> [(&'static str, BlockStyle); 4] {
        [
            ("heading1", self.heading1),
            ("heading2", self.heading2),
            ("heading3", self.heading3),
            ("body", self.body),
        ]
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            heading1: BlockStyle {
                font_size: 18.0,
                line_height: 10.0,
                spacing_after: 8.0,
            },
            heading2: BlockStyle {
                font_size: 16.0,
                line_height: 9.0,
                spacing_after: 6.0,
            },
            heading3: BlockStyle {
                font_size: 14.0,
                line_height: 8.0,
                spacing_after: 5.0,
            },
            body: BlockStyle {
                font_size: 11.0,
                line_height: 6.0,
                spacing_after: 3.0,
            },
            blank_line_gap: 5.0,
        }
    }
}

/// Summary history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Key under which the history array is persisted
    pub storage_key: String,

    /// Maximum number of records kept
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_key: HISTORY_STORAGE_KEY.to_string(),
            capacity: MAX_HISTORY_ENTRIES,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Base name used when the caller does not supply one
    pub default_base_name: String,

    /// Title printed in rich and page-layout exports
    pub document_title: String,

    /// Directory where the CLI writes artifacts (current directory when unset)
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_base_name: DEFAULT_EXPORT_BASE_NAME.to_string(),
            document_title: DEFAULT_DOCUMENT_TITLE.to_string(),
            output_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.history.capacity, 50);
        assert_eq!(config.history.storage_key, "selene_summary_history");
        assert_eq!(config.layout.page.margin, 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.layout.body.font_size, deserialized.layout.body.font_size);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"history": {"capacity": 10}}"#).unwrap();
        assert_eq!(config.history.capacity, 10);
        assert_eq!(config.history.storage_key, HISTORY_STORAGE_KEY);
        assert_eq!(config.layout.page.width, A4_WIDTH_MM);
    }

    #[test]
    fn test_page_geometry() {
        let page = PageConfig::default();
        assert_eq!(page.content_width(), 170.0);
        assert_eq!(page.printable_bottom(), 277.0);
        assert_eq!(page.printable_height(), 257.0);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = Config::default();
        config.history.capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_line_taller_than_page() {
        let mut config = Config::default();
        // 45 - 2 * 20 leaves 5mm, less than any default line height
        config.layout.page.height = 45.0;
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "layout.heading1.line_height"),
            other => panic!("unexpected result: {:?}", other),
        }

        let mut config = Config::default();
        config.layout.body.line_height = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config.export.default_base_name, "ai-summary");
    }

    #[test]
    fn test_save_and_load_round() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut config = Config::default();
        config.export.document_title = "Weekly Digest".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.export.document_title, "Weekly Digest");
    }
}
