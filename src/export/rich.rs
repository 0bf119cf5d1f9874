//! Styled document builders
//!
//! Both builders wrap the styled markup fragment in a complete document with
//! an embedded stylesheet and a header block (title, generation time and
//! content length):
//! - the rich document opens in word processors
//! - the print-ready document targets A4 printing and stands in for page
//!   layout when that backend is unavailable

use chrono::{DateTime, Utc};

use crate::markdown::{escape_html, to_styled_markup};
use crate::utils::time;

/// Header information shown above the document body
#[derive(Debug, Clone)]
pub struct DocumentHeader {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    /// Length of the source text in characters
    pub content_length: usize,
}

impl DocumentHeader {
    pub fn new(title: impl Into<String>, generated_at: DateTime<Utc>, source: &str) -> Self {
        Self {
            title: title.into(),
            generated_at,
            content_length: source.chars().count(),
        }
    }

    /// One-line metadata used by the page layout header
    pub fn meta_line(&self) -> String {
        format!(
            "Generated on: {} | Length: {} characters",
            time::display_timestamp(self.generated_at),
            self.content_length
        )
    }

    fn to_markup(&self) -> String {
        format!(
            r#"<div class="document-header">
        <h1>{}</h1>
        <div class="meta-info">
            <p><strong>Generated on:</strong> {}</p>
            <p><strong>Content Length:</strong> {} characters</p>
            <p><strong>Document Type:</strong> AI Summary Report</p>
        </div>
    </div>"#,
            escape_html(&self.title),
            time::display_timestamp(self.generated_at),
            self.content_length
        )
    }
}

/// Word-compatible styled document
pub fn rich_document(markdown: &str, header: &DocumentHeader) -> String {
    format!(
        r#"<html xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:w="urn:schemas-microsoft-com:office:word" xmlns="http://www.w3.org/TR/REC-html40">
<head>
    <meta charset="utf-8">
    <title>{}</title>
    {}
</head>
<body>
    {}
    <div class="content">
{}
    </div>
</body>
</html>"#,
        escape_html(&header.title),
        rich_styles(),
        header.to_markup(),
        to_styled_markup(markdown)
    )
}

/// Printable styled document sized for A4
pub fn print_document(markdown: &str, header: &DocumentHeader) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="generator" content="Selene Notebook">
    <title>{}</title>
    {}
</head>
<body>
    {}
    <div class="content">
{}
    </div>
</body>
</html>"#,
        escape_html(&header.title),
        print_styles(),
        header.to_markup(),
        to_styled_markup(markdown)
    )
}

fn base_styles() -> &'static str {
    r#"
        body {
            font-family: 'Times New Roman', serif;
            line-height: 1.6;
            color: #333;
        }
        h1 {
            font-size: 18pt;
            color: #2c3e50;
            border-bottom: 2px solid #3498db;
            padding-bottom: 10px;
            margin-bottom: 20px;
        }
        h2 {
            font-size: 16pt;
            color: #34495e;
            margin-top: 25px;
            margin-bottom: 15px;
        }
        h3 {
            font-size: 14pt;
            color: #34495e;
            margin-top: 20px;
            margin-bottom: 10px;
        }
        p {
            margin-bottom: 12px;
            text-align: justify;
        }
        ul, ol {
            margin-bottom: 12px;
            padding-left: 25px;
        }
        li {
            margin-bottom: 6px;
        }
        code {
            font-family: 'Courier New', monospace;
            background-color: #f4f4f4;
            padding: 2px 4px;
        }
        a {
            color: #2980b9;
        }
        .document-header {
            text-align: center;
            margin-bottom: 30px;
            padding: 20px;
            background-color: #f8f9fa;
            border: 1px solid #dee2e6;
        }
        .meta-info {
            font-size: 10pt;
            color: #6c757d;
            margin-top: 10px;
        }
        .meta-info p {
            text-align: center;
            margin-bottom: 4px;
        }"#
}

fn rich_styles() -> String {
    format!(
        r#"<style>
        @page {{
            margin: 1in;
        }}
        body {{
            font-size: 12pt;
            margin: 1in;
        }}{}
    </style>"#,
        base_styles()
    )
}

fn print_styles() -> String {
    format!(
        r#"<style>
        @page {{
            size: A4;
            margin: 20mm;
        }}
        body {{
            font-size: 11pt;
            max-width: 170mm;
            margin: 0 auto;
        }}{}
        h1, h2, h3 {{
            page-break-after: avoid;
        }}
        p, li {{
            page-break-inside: avoid;
        }}
    </style>"#,
        base_styles()
    )
}
