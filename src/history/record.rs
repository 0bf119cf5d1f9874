//! Persisted summary records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{text, time};

/// Default length of a history preview
pub const PREVIEW_CHARS: usize = 150;

/// A saved summary with its provenance.
///
/// Field names follow the persisted JSON layout (`summaryText`, `topP`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    /// Unique, strictly increasing, milliseconds-derived identifier
    pub id: i64,

    /// ISO-8601 creation time
    pub timestamp: String,

    #[serde(alias = "summary")]
    pub summary_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

impl SummaryRecord {
    /// Creation time, if the stored timestamp parses
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        time::parse_iso(&self.timestamp)
    }

    /// Creation time for display, falling back to the raw stored value
    pub fn display_timestamp(&self) -> String {
        self.created_at()
            .map(time::display_timestamp)
            .unwrap_or_else(|| self.timestamp.clone())
    }

    /// Shortened summary text for list views
    pub fn preview(&self, max_chars: usize) -> String {
        text::truncate(&self.summary_text, max_chars)
    }

    pub fn method_label(&self) -> &str {
        self.method.as_deref().unwrap_or("Default")
    }

    pub fn model_label(&self) -> &str {
        self.model.as_deref().unwrap_or("Unknown Model")
    }

    /// Base file name used when exporting this record
    pub fn export_base_name(&self) -> String {
        format!("summary-{}", self.id)
    }

    /// Markdown report combining provenance, source text and summary
    pub fn to_report_markdown(&self) -> String {
        format!(
            "# Summary Report\n\n**Generated:** {}\n**Method:** {}\n**Model:** {}\n\n## Original Text\n\n{}\n\n## Summary\n\n{}",
            self.display_timestamp(),
            self.method_label(),
            self.model_label(),
            self.original_text
                .as_deref()
                .unwrap_or("No original text available"),
            self.summary_text
        )
    }
}

/// Fields supplied by the caller when saving a summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSummary {
    pub summary_text: String,
    pub original_text: Option<String>,
    pub method: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

impl NewSummary {
    pub fn new(summary_text: impl Into<String>) -> Self {
        Self {
            summary_text: summary_text.into(),
            ..Default::default()
        }
    }

    pub fn with_original_text(mut self, text: impl Into<String>) -> Self {
        self.original_text = Some(text.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_sampling(mut self, temperature: f64, top_p: f64) -> Self {
        self.temperature = Some(temperature);
        self.top_p = Some(top_p);
        self
    }

    pub(crate) fn into_record(self, id: i64, timestamp: String) -> SummaryRecord {
        SummaryRecord {
            id,
            timestamp,
            summary_text: self.summary_text,
            original_text: self.original_text,
            method: self.method,
            model: self.model,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SummaryRecord {
        NewSummary::new("The summary.")
            .with_method("extractive")
            .with_sampling(0.7, 0.9)
            .into_record(1714566605000, "2024-05-01T12:30:05.000Z".to_string())
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["summaryText"], "The summary.");
        assert_eq!(json["topP"], 0.9);
        assert!(json.get("originalText").is_none());
    }

    #[test]
    fn test_reads_legacy_summary_field() {
        let raw = r#"{"id": 5, "timestamp": "2024-05-01T12:30:05.000Z", "summary": "old", "model": "m"}"#;
        let parsed: SummaryRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.summary_text, "old");
        assert_eq!(parsed.model.as_deref(), Some("m"));
        assert_eq!(parsed.method, None);
    }

    #[test]
    fn test_report_markdown() {
        let report = record().to_report_markdown();
        assert!(report.starts_with("# Summary Report"));
        assert!(report.contains("**Method:** extractive"));
        assert!(report.contains("**Model:** Unknown Model"));
        assert!(report.contains("No original text available"));
        assert!(report.ends_with("## Summary\n\nThe summary."));
    }

    #[test]
    fn test_presentation_helpers() {
        let rec = record();
        assert_eq!(rec.display_timestamp(), "May 1, 2024, 12:30 PM");
        assert_eq!(rec.preview(3), "The...");
        assert_eq!(rec.export_base_name(), "summary-1714566605000");
    }
}
