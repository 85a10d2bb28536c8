//! Addressable text segments of one rendered lesson.
//!
//! Every non-blank leaf becomes a segment; the segments' texts concatenated in
//! order form the lesson text stream, and every range in the engine is a byte
//! range into that stream.

use crate::content::RenderedContent;
use crate::types::TextRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub index: usize,
    pub block: usize,
    pub leaf: usize,
    /// Offset of the first byte in the lesson text stream.
    pub start: usize,
    pub text: String,
}

impl TextSegment {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.end())
    }
}

/// Segments touched by a range, with the cut points inside the outer ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpan {
    pub first: usize,
    pub last: usize,
    pub start_in_first: usize,
    pub end_in_last: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentModel {
    segments: Vec<TextSegment>,
    text: String,
}

impl SegmentModel {
    pub fn build(root: &RenderedContent) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        for (block, leaf, node) in root.leaves() {
            if node.text.trim().is_empty() {
                continue;
            }
            segments.push(TextSegment {
                index: segments.len(),
                block,
                leaf,
                start: text.len(),
                text: node.text.clone(),
            });
            text.push_str(&node.text);
        }
        Self { segments, text }
    }

    pub fn segments(&self) -> &[TextSegment] {
        &self.segments
    }

    pub fn get(&self, index: usize) -> Option<&TextSegment> {
        self.segments.get(index)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn slice(&self, range: TextRange) -> Option<&str> {
        self.text.get(range.start..range.end)
    }

    /// Segment whose bytes include `offset`.
    pub fn segment_at(&self, offset: usize) -> Option<&TextSegment> {
        let idx = self.segments.partition_point(|s| s.end() <= offset);
        self.segments.get(idx).filter(|s| s.start <= offset)
    }

    pub fn segments_in_block(&self, block: usize) -> impl Iterator<Item = &TextSegment> {
        self.segments.iter().filter(move |s| s.block == block)
    }

    pub fn span_of(&self, range: TextRange) -> Option<SegmentSpan> {
        if range.is_empty() || range.end > self.text.len() {
            return None;
        }
        let first = self.segment_at(range.start)?;
        let last = self.segment_at(range.end - 1)?;
        Some(SegmentSpan {
            first: first.index,
            last: last.index,
            start_in_first: range.start - first.start,
            end_in_last: range.end - last.start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BlockKind, ContentBlock, TextLeaf};

    fn content(blocks: &[&[&str]]) -> RenderedContent {
        RenderedContent::new(
            blocks
                .iter()
                .map(|leaves| {
                    ContentBlock::new(
                        BlockKind::Paragraph,
                        leaves.iter().map(|t| TextLeaf::plain(*t)).collect(),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn builds_segments_in_document_order() {
        let model = SegmentModel::build(&content(&[&["The ", "cell"], &["Mitosis"]]));
        assert_eq!(model.len(), 3);
        assert_eq!(model.text(), "The cellMitosis");
        let seg = model.get(2).unwrap();
        assert_eq!((seg.block, seg.leaf, seg.start), (1, 0, 8));
    }

    #[test]
    fn skips_whitespace_only_leaves() {
        let model = SegmentModel::build(&content(&[&["a", "  ", "\n", "b"]]));
        assert_eq!(model.len(), 2);
        assert_eq!(model.text(), "ab");
        assert_eq!(model.get(1).unwrap().leaf, 3);
        assert_eq!(model.get(1).unwrap().index, 1);
    }

    #[test]
    fn empty_root_gives_empty_model() {
        let model = SegmentModel::build(&RenderedContent::default());
        assert!(model.is_empty());
        assert_eq!(model.text(), "");
        assert!(model.segment_at(0).is_none());
    }

    #[test]
    fn finds_segment_by_offset() {
        let model = SegmentModel::build(&content(&[&["abc", "de"]]));
        assert_eq!(model.segment_at(0).unwrap().index, 0);
        assert_eq!(model.segment_at(2).unwrap().index, 0);
        assert_eq!(model.segment_at(3).unwrap().index, 1);
        assert!(model.segment_at(5).is_none());
    }

    #[test]
    fn span_covers_partial_segments() {
        let model = SegmentModel::build(&content(&[&["cell ", "membrane", " is"]]));
        let span = model.span_of(TextRange::new(2, 9)).unwrap();
        assert_eq!(span.first, 0);
        assert_eq!(span.last, 1);
        assert_eq!(span.start_in_first, 2);
        assert_eq!(span.end_in_last, 4);
        assert!(model.span_of(TextRange::new(3, 3)).is_none());
        assert!(model.span_of(TextRange::new(0, 99)).is_none());
    }
}
