//! Utilities module for Selene Notebook
//!
//! Shared helper functions and utilities including:
//! - Injectable clock
//! - Timestamp formatting
//! - Text utilities

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Clock reading the system time
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Clock frozen at `at`
pub fn fixed_clock(at: DateTime<Utc>) -> Clock {
    Arc::new(move || at)
}

/// Timestamp utilities
pub mod time {
    use chrono::{DateTime, SecondsFormat, Utc};

    /// ISO-8601 with millisecond precision, e.g. `2024-05-01T12:30:00.000Z`
    pub fn iso_timestamp(at: DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Second-resolution ISO timestamp with colons replaced for file names
    pub fn filename_timestamp(at: DateTime<Utc>) -> String {
        at.format("%Y-%m-%dT%H:%M:%S").to_string().replace(':', "-")
    }

    /// Parse a stored ISO-8601 timestamp
    pub fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Short human-readable form, e.g. `May 1, 2024, 12:30 PM`
    pub fn display_timestamp(at: DateTime<Utc>) -> String {
        at.format("%b %-d, %Y, %I:%M %p").to_string()
    }
}

/// Text utilities
pub mod text {
    /// Count words in text
    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Truncate to `max_chars` characters, appending `...` when shortened
    pub fn truncate(s: &str, max_chars: usize) -> String {
        match s.char_indices().nth(max_chars) {
            None => s.to_string(),
            Some((cut, _)) => format!("{}...", &s[..cut]),
        }
    }
}
