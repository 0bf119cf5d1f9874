//! Page-oriented artifact backend
//!
//! Turns laid-out pages into a PDF document. The backend sits behind a
//! loader so that an environment can provide its own renderer; loading
//! happens at most once per process and every caller shares the outcome.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::engine::RenderedPage;
use super::measure::{MM_TO_PT, PT_TO_MM};
use crate::config::PageConfig;
use crate::error::LayoutError;

/// Descriptive metadata embedded in the artifact
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: String,
    pub subject: String,
    pub author: String,
    pub creator: String,
}

/// Renders laid-out pages into artifact bytes
pub trait LayoutBackend: Send + Sync {
    fn name(&self) -> &str;

    fn render(
        &self,
        pages: &[RenderedPage],
        page: &PageConfig,
        info: &DocumentInfo,
    ) -> Result<Vec<u8>, LayoutError>;
}

/// Produces a [`LayoutBackend`], possibly after asynchronous setup
#[async_trait]
pub trait BackendLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn LayoutBackend>, LayoutError>;
}

/// Loader for the built-in PDF writer
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPdfLoader;

#[async_trait]
impl BackendLoader for BuiltinPdfLoader {
    async fn load(&self) -> Result<Arc<dyn LayoutBackend>, LayoutError> {
        Ok(Arc::new(PdfWriter))
    }
}

/// Memoized backend initialization.
///
/// The first caller runs the loader; concurrent callers wait for it and all
/// later callers receive the cached success or failure.
pub struct LazyBackend {
    loader: Box<dyn BackendLoader>,
    cell: OnceCell<Result<Arc<dyn LayoutBackend>, LayoutError>>,
}

impl LazyBackend {
    pub fn new(loader: impl BackendLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cell: OnceCell::new(),
        }
    }

    /// Backed by the built-in PDF writer
    pub fn builtin() -> Self {
        Self::new(BuiltinPdfLoader)
    }

    pub async fn get(&self) -> Result<Arc<dyn LayoutBackend>, LayoutError> {
        self.cell
            .get_or_init(|| async {
                let loaded = self.loader.load().await;
                match &loaded {
                    Ok(backend) => log::info!("Layout backend '{}' ready", backend.name()),
                    Err(e) => log::warn!("Layout backend failed to load: {}", e),
                }
                loaded
            })
            .await
            .clone()
    }

    /// Whether initialization has already completed (successfully or not)
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl Default for LazyBackend {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Minimal PDF 1.4 writer using the standard Helvetica fonts
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

/// Heading colour (#34495e)
const HEADING_RGB: (f32, f32, f32) = (0.204, 0.286, 0.369);

impl PdfWriter {
    fn content_stream(page: &RenderedPage, config: &PageConfig) -> String {
        let mut stream = String::new();
        let x = config.margin * MM_TO_PT;

        for block in &page.blocks {
            let (font, colour) = if block.kind.is_heading() {
                ("F2", HEADING_RGB)
            } else {
                ("F1", (0.0, 0.0, 0.0))
            };

            for (i, line) in block.lines.iter().enumerate() {
                // Baseline sits one font size below the top of the line slot
                let baseline_mm = block.y + i as f32 * block.line_height + block.font_size * PT_TO_MM;
                let y = (config.height - baseline_mm) * MM_TO_PT;
                let _ = writeln!(
                    stream,
                    "BT {:.3} {:.3} {:.3} rg /{} {:.1} Tf {:.2} {:.2} Td ({}) Tj ET",
                    colour.0,
                    colour.1,
                    colour.2,
                    font,
                    block.font_size,
                    x,
                    y,
                    encode_text(line)
                );
            }
        }

        stream
    }
}

impl LayoutBackend for PdfWriter {
    fn name(&self) -> &str {
        "builtin-pdf"
    }

    fn render(
        &self,
        pages: &[RenderedPage],
        page: &PageConfig,
        info: &DocumentInfo,
    ) -> Result<Vec<u8>, LayoutError> {
        if pages.is_empty() {
            return Err(LayoutError::RenderFailed("document has no pages".to_string()));
        }

        let width = page.width * MM_TO_PT;
        let height = page.height * MM_TO_PT;

        // 1 catalog, 2 page tree, 3-4 fonts, 5 info, then a page + stream pair per page
        let first_page_id = 6;
        let page_ids: Vec<usize> = (0..pages.len()).map(|i| first_page_id + i * 2).collect();

        let mut objects: Vec<String> = Vec::new();
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            page_ids
                .iter()
                .map(|id| format!("{} 0 R", id))
                .collect::<Vec<_>>()
                .join(" "),
            pages.len()
        ));
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        objects.push(format!(
            "<< /Title ({}) /Subject ({}) /Author ({}) /Creator ({}) /Producer (selene-notebook) >>",
            encode_text(&info.title),
            encode_text(&info.subject),
            encode_text(&info.author),
            encode_text(&info.creator)
        ));

        for (rendered, page_id) in pages.iter().zip(&page_ids) {
            let stream = Self::content_stream(rendered, page);
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                width,
                height,
                page_id + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                stream.len(),
                stream
            ));
        }

        let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_at = out.len();
        let mut trailer = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(trailer, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            trailer,
            "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        );
        out.extend_from_slice(trailer.as_bytes());

        log::debug!("Rendered {} page(s) into {} PDF bytes", pages.len(), out.len());
        Ok(out)
    }
}

/// Escape a string for a PDF literal, mapping to WinAnsi where possible.
///
/// Characters outside WinAnsi become `?`; bytes above 0x7f are written as
/// octal escapes so the content stream stays ASCII.
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(c),
            _ => {
                let byte = match c {
                    '€' => 0x80,
                    '…' => 0x85,
                    '‘' => 0x91,
                    '’' => 0x92,
                    '“' => 0x93,
                    '”' => 0x94,
                    '•' => 0x95,
                    '–' => 0x96,
                    '—' => 0x97,
                    '\u{a0}'..='\u{ff}' => c as u32,
                    _ => u32::from(b'?'),
                };
                if byte < 0x80 {
                    out.push(char::from(byte as u8));
                } else {
                    let _ = write!(out, "\\{:03o}", byte);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::PageLayoutEngine;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl BackendLoader for CountingLoader {
        async fn load(&self) -> Result<Arc<dyn LayoutBackend>, LayoutError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                Err(LayoutError::BackendUnavailable("renderer missing".to_string()))
            } else {
                Ok(Arc::new(PdfWriter))
            }
        }
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(encode_text("• item"), "\\225 item");
        assert_eq!(encode_text("café"), "caf\\351");
        assert_eq!(encode_text("日本"), "??");
    }

    #[test]
    fn test_render_pdf_structure() {
        let engine = PageLayoutEngine::new(LayoutConfig::default());
        let pages = engine.layout("# Title\n\nBody (with parens).");
        let bytes = PdfWriter
            .render(&pages, &PageConfig::default(), &DocumentInfo::default())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("(Title) Tj"));
        assert!(text.contains("(Body \\(with parens\\).) Tj"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_render_counts_pages() {
        let engine = PageLayoutEngine::new(LayoutConfig::default());
        let doc = vec!["line"; 80].join("\n");
        let pages = engine.layout(&doc);
        let bytes = PdfWriter
            .render(&pages, &PageConfig::default(), &DocumentInfo::default())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains(&format!("/Count {}", pages.len())));
    }

    #[test]
    fn test_render_rejects_no_pages() {
        let result = PdfWriter.render(&[], &PageConfig::default(), &DocumentInfo::default());
        assert!(matches!(result, Err(LayoutError::RenderFailed(_))));
    }

    #[tokio::test]
    async fn test_lazy_backend_loads_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = Arc::new(LazyBackend::new(CountingLoader {
            calls: calls.clone(),
            fail: false,
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let backend = backend.clone();
                tokio::spawn(async move { backend.get().await.is_ok() })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(backend.is_initialized());
    }

    #[tokio::test]
    async fn test_lazy_backend_caches_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = LazyBackend::new(CountingLoader {
            calls: calls.clone(),
            fail: true,
        });

        assert!(backend.get().await.is_err());
        assert!(backend.get().await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
