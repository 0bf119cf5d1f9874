//! Paragraph segmentation for per-paragraph editing
//!
//! A summary is split on the literal sentinel `###` into ordered paragraph
//! units. Splitting keeps empty segments and never trims, so joining the
//! units back with the sentinel reproduces the original document exactly.

use std::ops::Range;

use async_trait::async_trait;

use crate::error::{SegmentError, SegmentResult, TransformError};

/// Delimiter between independently editable paragraphs
pub const SENTINEL: &str = "###";

/// Split a document into paragraph units
pub fn segment(doc: &str) -> Vec<String> {
    doc.split(SENTINEL).map(str::to_string).collect()
}

/// Join paragraph units with the sentinel
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push_str(SENTINEL);
        }
        out.push_str(segment.as_ref());
    }
    out
}

/// Byte range each segment occupies in `doc`
pub fn segment_spans(doc: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (at, _) in doc.match_indices(SENTINEL) {
        spans.push(start..at);
        start = at + SENTINEL.len();
    }
    spans.push(start..doc.len());
    spans
}

/// Rewrite operations offered for a single paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostProcessOp {
    Shorten,
    Simplify,
    Rephrase,
}

impl PostProcessOp {
    pub const ALL: [PostProcessOp; 3] = [
        PostProcessOp::Simplify,
        PostProcessOp::Shorten,
        PostProcessOp::Rephrase,
    ];

    /// Path of the rewrite endpoint on the summarization service
    pub fn endpoint(&self) -> &'static str {
        match self {
            PostProcessOp::Shorten => "/shorten",
            PostProcessOp::Simplify => "/simplify",
            PostProcessOp::Rephrase => "/rephrase",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PostProcessOp::Shorten => "Shorten",
            PostProcessOp::Simplify => "Simplify",
            PostProcessOp::Rephrase => "Rephrase",
        }
    }

    /// Parse an operation name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.display_name().eq_ignore_ascii_case(name.trim()))
    }
}

/// External capability rewriting one paragraph
#[async_trait]
pub trait TextTransform: Send + Sync {
    async fn transform(&self, op: PostProcessOp, text: &str) -> Result<String, TransformError>;
}

/// An ordered sequence of paragraphs derived from one document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paragraphs {
    segments: Vec<String>,
}

impl Paragraphs {
    pub fn parse(doc: &str) -> Self {
        Self {
            segments: segment(doc),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    fn check_index(&self, index: usize) -> SegmentResult<()> {
        if index < self.segments.len() {
            Ok(())
        } else {
            Err(SegmentError::IndexOutOfRange {
                index,
                len: self.segments.len(),
            })
        }
    }

    /// Replace paragraph `index`, leaving every other paragraph untouched
    pub fn replace(&mut self, index: usize, text: impl Into<String>) -> SegmentResult<()> {
        self.check_index(index)?;
        self.segments[index] = text.into();
        Ok(())
    }

    /// Replace paragraph `index` with the result of a synchronous rewrite
    pub fn map_paragraph<F>(&mut self, index: usize, rewrite: F) -> SegmentResult<()>
    where
        F: FnOnce(&str) -> Result<String, TransformError>,
    {
        self.check_index(index)?;
        let rewritten = rewrite(&self.segments[index]).map_err(SegmentError::Transform)?;
        self.segments[index] = rewritten;
        Ok(())
    }

    /// Run an external rewrite on paragraph `index` only.
    ///
    /// The capability sees nothing but that paragraph's text. On failure the
    /// sequence is left as it was.
    pub async fn reprocess(
        &mut self,
        index: usize,
        op: PostProcessOp,
        transform: &dyn TextTransform,
    ) -> SegmentResult<()> {
        self.check_index(index)?;
        log::debug!("Reprocessing paragraph {} with {}", index, op.display_name());

        let rewritten = transform
            .transform(op, &self.segments[index])
            .await
            .map_err(|e| {
                log::warn!("{} failed for paragraph {}: {}", op.display_name(), index, e);
                SegmentError::Transform(e)
            })?;

        self.segments[index] = rewritten;
        Ok(())
    }

    pub fn to_document(&self) -> String {
        join(&self.segments)
    }

    pub fn into_segments(self) -> Vec<String> {
        self.segments
    }
}

/// Replace paragraph `index` of `doc` and return the rejoined document
pub fn replace_paragraph(doc: &str, index: usize, text: &str) -> SegmentResult<String> {
    let mut paragraphs = Paragraphs::parse(doc);
    paragraphs.replace(index, text)?;
    Ok(paragraphs.to_document())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Upper {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextTransform for Upper {
        async fn transform(&self, _op: PostProcessOp, text: &str) -> Result<String, TransformError> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(text.to_uppercase())
        }
    }

    struct Failing;

    #[async_trait]
    impl TextTransform for Failing {
        async fn transform(&self, _op: PostProcessOp, _text: &str) -> Result<String, TransformError> {
            Err(TransformError::new("service unavailable"))
        }
    }

    #[test]
    fn test_round_trip() {
        let docs = [
            "",
            "###",
            "######",
            "###lead",
            "trail###",
            "a######b",
            "para one###para two###para three",
            "# Heading\n###\n## Sub\n###\nbody",
            "####x",
            "ü###ß###",
        ];
        for doc in docs {
            assert_eq!(join(&segment(doc)), doc, "round trip failed for {:?}", doc);
        }
    }

    #[test]
    fn test_segment_keeps_empty_segments() {
        assert_eq!(segment(""), vec![""]);
        assert_eq!(segment("###"), vec!["", ""]);
        assert_eq!(segment("a######b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_three_paragraph_edit() {
        let doc = "para one###para two###para three";
        assert_eq!(segment(doc), vec!["para one", "para two", "para three"]);
        assert_eq!(
            replace_paragraph(doc, 1, "EDITED").unwrap(),
            "para one###EDITED###para three"
        );
    }

    #[test]
    fn test_edit_locality() {
        let doc = "alpha###\nbeta gamma\n###delta";
        let original_spans = segment_spans(doc);
        let edited = replace_paragraph(doc, 1, "X").unwrap();
        let edited_spans = segment_spans(&edited);

        assert_eq!(original_spans.len(), edited_spans.len());
        for i in [0, 2] {
            assert_eq!(&doc[original_spans[i].clone()], &edited[edited_spans[i].clone()]);
        }
        assert_eq!(&edited[edited_spans[1].clone()], "X");
    }

    #[test]
    fn test_spans_match_segments() {
        let doc = "###a###bc###";
        let spans = segment_spans(doc);
        let segments = segment(doc);
        assert_eq!(spans.len(), segments.len());
        for (span, seg) in spans.iter().zip(&segments) {
            assert_eq!(&doc[span.clone()], seg);
        }
    }

    #[test]
    fn test_replace_out_of_range() {
        let mut paragraphs = Paragraphs::parse("a###b");
        let err = paragraphs.replace(2, "c").unwrap_err();
        assert!(matches!(err, SegmentError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(paragraphs.to_document(), "a###b");
    }

    #[test]
    fn test_map_paragraph_failure_leaves_document() {
        let mut paragraphs = Paragraphs::parse("a###b");
        let result = paragraphs.map_paragraph(0, |_| Err(TransformError::new("nope")));
        assert!(matches!(result, Err(SegmentError::Transform(_))));
        assert_eq!(paragraphs.to_document(), "a###b");
    }

    #[tokio::test]
    async fn test_reprocess_sees_only_its_paragraph() {
        let upper = Upper {
            seen: Mutex::new(Vec::new()),
        };
        let mut paragraphs = Paragraphs::parse("one###two###three");
        paragraphs
            .reprocess(1, PostProcessOp::Simplify, &upper)
            .await
            .unwrap();

        assert_eq!(paragraphs.to_document(), "one###TWO###three");
        assert_eq!(*upper.seen.lock().unwrap(), vec!["two".to_string()]);
    }

    #[tokio::test]
    async fn test_reprocess_failure_is_surfaced() {
        let mut paragraphs = Paragraphs::parse("one###two");
        let err = paragraphs
            .reprocess(0, PostProcessOp::Shorten, &Failing)
            .await
            .unwrap_err();
        assert!(matches!(err, SegmentError::Transform(_)));
        assert_eq!(paragraphs.to_document(), "one###two");
    }

    #[tokio::test]
    async fn test_reprocess_out_of_range() {
        let mut paragraphs = Paragraphs::parse("only");
        let err = paragraphs
            .reprocess(3, PostProcessOp::Rephrase, &Failing)
            .await
            .unwrap_err();
        assert!(matches!(err, SegmentError::IndexOutOfRange { index: 3, len: 1 }));
    }

    #[test]
    fn test_post_process_ops() {
        assert_eq!(PostProcessOp::Shorten.endpoint(), "/shorten");
        assert_eq!(PostProcessOp::from_name("simplify"), Some(PostProcessOp::Simplify));
        assert_eq!(PostProcessOp::from_name("Expand"), None);
    }
}
