//! Export orchestration
//!
//! Renders text into the requested artifact, names it, and offers it to the
//! host's sink. Page-layout exports go through the lazily loaded backend and
//! fall back to a print-ready document when that backend cannot load or
//! render.

use std::sync::Arc;

use super::format::{generate_filename, ArtifactKind, ExportChoice, ExportFormat, FormatChooser};
use super::rich::{print_document, rich_document, DocumentHeader};
use super::sink::{ArtifactSink, OfferOutcome};
use crate::config::{Config, ExportConfig};
use crate::error::{ExportError, ExportResult, LayoutError};
use crate::history::SummaryRecord;
use crate::layout::{DocumentInfo, LayoutHeader, LazyBackend, PageLayoutEngine};
use crate::markdown::to_plain_text;
use crate::utils::{system_clock, Clock};

/// Rendered artifact ready to be offered
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }
}

/// Result of a completed export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    pub kind: ArtifactKind,
    pub filename: String,
    /// The print-ready document replaced an unavailable page layout
    pub fell_back: bool,
    pub offer: OfferOutcome,
}

/// What happened after presenting the export menu
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceOutcome {
    Cancelled,
    Exported(ExportOutcome),
}

impl ChoiceOutcome {
    /// The menu entry the user picked
    pub fn choice(&self) -> ExportChoice {
        match self {
            ChoiceOutcome::Cancelled => ExportChoice::Cancel,
            ChoiceOutcome::Exported(outcome) => ExportChoice::Format(outcome.format),
        }
    }
}

/// Turns text into artifacts and offers them to a sink
pub struct ExportCoordinator<K: ArtifactSink> {
    sink: K,
    engine: PageLayoutEngine,
    backend: Arc<LazyBackend>,
    config: ExportConfig,
    clock: Clock,
}

impl<K: ArtifactSink> ExportCoordinator<K> {
    /// Coordinator using the built-in page layout backend and system clock
    pub fn new(sink: K, config: &Config) -> Self {
        Self {
            sink,
            engine: PageLayoutEngine::new(config.layout.clone()),
            backend: Arc::new(LazyBackend::builtin()),
            config: config.export.clone(),
            clock: system_clock(),
        }
    }

    /// Share a backend (and its one-time initialization) with other callers
    pub fn with_backend(mut self, backend: Arc<LazyBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_engine(mut self, engine: PageLayoutEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Render `text` in `format` without offering it
    pub async fn render(&self, text: &str, format: ExportFormat, base_name: &str) -> Artifact {
        let now = (self.clock)();
        let header = DocumentHeader::new(self.config.document_title.clone(), now, text);

        let (kind, bytes) = match format {
            ExportFormat::Plain => (ArtifactKind::PlainText, to_plain_text(text).into_bytes()),
            ExportFormat::Rich => (
                ArtifactKind::RichDocument,
                rich_document(text, &header).into_bytes(),
            ),
            ExportFormat::PageLayout => match self.render_page_layout(text, &header).await {
                Ok(bytes) => (ArtifactKind::PageLayout, bytes),
                Err(e) => {
                    log::warn!("Page layout unavailable, exporting print-ready document: {}", e);
                    (
                        ArtifactKind::PrintReady,
                        print_document(text, &header).into_bytes(),
                    )
                }
            },
        };

        Artifact {
            kind,
            filename: generate_filename(base_name, kind.extension(), now),
            bytes,
        }
    }

    async fn render_page_layout(&self, text: &str, header: &DocumentHeader) -> Result<Vec<u8>, LayoutError> {
        let backend = self.backend.get().await?;
        let engine = self.engine.clone().with_header(LayoutHeader {
            title: header.title.clone(),
            meta: header.meta_line(),
        });
        let pages = engine.layout(text);
        log::debug!("Laid out export on {} page(s)", pages.len());

        let info = DocumentInfo {
            title: header.title.clone(),
            subject: "Summary Export".to_string(),
            author: "Selene Notebook".to_string(),
            creator: "Selene Notebook".to_string(),
        };
        backend.render(&pages, &engine.config().page, &info)
    }

    /// Render `text` and offer it to the sink under `base_name`
    pub async fn export(&self, text: &str, format: ExportFormat, base_name: &str) -> ExportResult<ExportOutcome> {
        let artifact = self.render(text, format, base_name).await;
        self.offer(format, artifact)
    }

    /// Export under the configured default base name
    pub async fn quick_export(&self, text: &str, format: ExportFormat) -> ExportResult<ExportOutcome> {
        self.export(text, format, &self.config.default_base_name).await
    }

    /// Ask `chooser` for a format and export with it, unless cancelled
    pub async fn export_with_choice(
        &self,
        text: &str,
        base_name: &str,
        chooser: &dyn FormatChooser,
    ) -> ExportResult<ChoiceOutcome> {
        match chooser.choose(&ExportChoice::menu()) {
            ExportChoice::Cancel => {
                log::debug!("Export cancelled");
                Ok(ChoiceOutcome::Cancelled)
            }
            ExportChoice::Format(format) => self
                .export(text, format, base_name)
                .await
                .map(ChoiceOutcome::Exported),
        }
    }

    /// Export a saved summary as a report named after the record
    pub async fn export_record(
        &self,
        record: &SummaryRecord,
        chooser: &dyn FormatChooser,
    ) -> ExportResult<ChoiceOutcome> {
        self.export_with_choice(&record.to_report_markdown(), &record.export_base_name(), chooser)
            .await
    }

    fn offer(&self, format: ExportFormat, artifact: Artifact) -> ExportResult<ExportOutcome> {
        let offer = self
            .sink
            .offer_artifact(&artifact.bytes, &artifact.filename, artifact.mime_type())
            .map_err(|e| match e {
                ExportError::Io(source) => ExportError::SinkFailed {
                    filename: artifact.filename.clone(),
                    reason: source.to_string(),
                },
                other => other,
            })?;

        if offer == OfferOutcome::Declined {
            log::info!("Export {} was declined", artifact.filename);
        }

        Ok(ExportOutcome {
            format,
            kind: artifact.kind,
            fell_back: format == ExportFormat::PageLayout && artifact.kind == ArtifactKind::PrintReady,
            filename: artifact.filename,
            offer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::format::FixedChoice;
    use crate::export::sink::MemorySink;
    use crate::history::NewSummary;
    use crate::layout::{BackendLoader, LayoutBackend};
    use crate::utils::fixed_clock;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingLoader {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BackendLoader for FailingLoader {
        async fn load(&self) -> Result<Arc<dyn LayoutBackend>, LayoutError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LayoutError::BackendUnavailable("offline".to_string()))
        }
    }

    struct RejectingSink;

    impl ArtifactSink for RejectingSink {
        fn offer_artifact(&self, _bytes: &[u8], _filename: &str, _mime: &str) -> ExportResult<OfferOutcome> {
            Err(ExportError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 5, 7).unwrap()
    }

    fn coordinator() -> ExportCoordinator<MemorySink> {
        ExportCoordinator::new(MemorySink::new(), &Config::default()).with_clock(fixed_clock(at()))
    }

    #[tokio::test]
    async fn test_plain_export() {
        let exporter = coordinator();
        let outcome = exporter
            .export("# Title\n\nSome **bold** text.", ExportFormat::Plain, "notes")
            .await
            .unwrap();

        assert_eq!(outcome.filename, "notes_2024-05-01T09-05-07.txt");
        assert_eq!(outcome.kind, ArtifactKind::PlainText);
        assert!(!outcome.fell_back);

        let offered = exporter.sink().offered();
        assert_eq!(offered.len(), 1);
        assert_eq!(offered[0].mime_type, "text/plain;charset=utf-8");
        let expected = format!("Title\n{}\n\nSome bold text.", "=".repeat(40));
        assert_eq!(String::from_utf8(offered[0].bytes.clone()).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_rich_export() {
        let exporter = coordinator();
        let outcome = exporter.quick_export("Hello", ExportFormat::Rich).await.unwrap();
        assert_eq!(outcome.filename, "ai-summary_2024-05-01T09-05-07.doc");

        let offered = exporter.sink().offered();
        let body = String::from_utf8(offered[0].bytes.clone()).unwrap();
        assert!(body.contains("<p>Hello</p>"));
        assert!(body.contains("AI Generated Summary"));
        assert!(offered[0].mime_type.starts_with("application/msword"));
    }

    #[tokio::test]
    async fn test_page_layout_export() {
        let exporter = coordinator();
        let outcome = exporter
            .export("# Report\n\nBody.", ExportFormat::PageLayout, "r")
            .await
            .unwrap();
        assert_eq!(outcome.kind, ArtifactKind::PageLayout);
        assert_eq!(outcome.filename, "r_2024-05-01T09-05-07.pdf");

        let offered = exporter.sink().offered();
        assert!(offered[0].bytes.starts_with(b"%PDF-"));
        assert_eq!(offered[0].mime_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_page_layout_falls_back_when_backend_fails() {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = Arc::new(LazyBackend::new(FailingLoader {
            calls: calls.clone(),
        }));
        let exporter = coordinator().with_backend(backend);

        for _ in 0..2 {
            let outcome = exporter
                .export("# Report\n\nBody.", ExportFormat::PageLayout, "r")
                .await
                .unwrap();
            assert!(outcome.fell_back);
            assert_eq!(outcome.kind, ArtifactKind::PrintReady);
            assert_eq!(outcome.filename, "r_2024-05-01T09-05-07.html");
        }

        // initialization is attempted once and the failure is reused
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let offered = exporter.sink().offered();
        assert_eq!(offered.len(), 2);
        let body = String::from_utf8(offered[0].bytes.clone()).unwrap();
        assert!(body.contains("size: A4;"));
        assert!(body.contains("<h1>Report</h1>"));
    }

    #[tokio::test]
    async fn test_sink_failure_is_reported() {
        let exporter = ExportCoordinator::new(RejectingSink, &Config::default()).with_clock(fixed_clock(at()));
        let err = exporter.export("x", ExportFormat::Plain, "x").await.unwrap_err();
        match &err {
            ExportError::SinkFailed { filename, reason } => {
                assert_eq!(filename, "x_2024-05-01T09-05-07.txt");
                assert!(reason.contains("read-only"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!err.user_message().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_offers_nothing() {
        let exporter = coordinator();
        let outcome = exporter
            .export_with_choice("text", "base", &FixedChoice(ExportChoice::Cancel))
            .await
            .unwrap();
        assert_eq!(outcome, ChoiceOutcome::Cancelled);
        assert_eq!(outcome.choice(), ExportChoice::Cancel);
        assert!(exporter.sink().offered().is_empty());
    }

    #[tokio::test]
    async fn test_choice_is_reported() {
        let exporter = coordinator();
        let outcome = exporter
            .export_with_choice(
                "text",
                "base",
                &FixedChoice(ExportChoice::Format(ExportFormat::Rich)),
            )
            .await
            .unwrap();
        assert_eq!(outcome.choice(), ExportChoice::Format(ExportFormat::Rich));
    }

    #[tokio::test]
    async fn test_export_record_uses_record_name() {
        let exporter = coordinator();
        let record = NewSummary::new("The gist.")
            .with_original_text("Long source.")
            .into_record(42, "2024-05-01T09:05:07.000Z".to_string());
        let outcome = exporter
            .export_record(&record, &FixedChoice(ExportChoice::Format(ExportFormat::Plain)))
            .await
            .unwrap();

        match outcome {
            ChoiceOutcome::Exported(done) => {
                assert_eq!(done.filename, "summary-42_2024-05-01T09-05-07.txt")
            }
            ChoiceOutcome::Cancelled => panic!("export was cancelled"),
        }
        let body = String::from_utf8(exporter.sink().offered()[0].bytes.clone()).unwrap();
        assert!(body.starts_with("Summary Report\n"));
        assert!(body.contains("Long source."));
    }

    #[tokio::test]
    async fn test_declined_offer_is_not_an_error() {
        let exporter = ExportCoordinator::new(MemorySink::declining(), &Config::default());
        let outcome = exporter.export("x", ExportFormat::Plain, "x").await.unwrap();
        assert_eq!(outcome.offer, OfferOutcome::Declined);
    }
}
