//! Rendered lesson content.
//!
//! Lesson sources (HTML, plain text or light Markdown) are flattened into
//! blocks of styled text leaves in document order. Marks never touch this
//! tree; they live in a decoration layer keyed by offsets into the text
//! stream built from it (see [`crate::segments`]).

mod html;
mod text;

use std::path::Path;

use thiserror::Error;

pub use html::html_to_blocks;
pub use text::text_to_blocks;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    ListItem,
    Quote,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLeaf {
    pub text: String,
    pub style: InlineStyle,
}

impl TextLeaf {
    pub fn new(text: impl Into<String>, style: InlineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, InlineStyle::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub kind: BlockKind,
    pub leaves: Vec<TextLeaf>,
}

impl ContentBlock {
    pub fn new(kind: BlockKind, leaves: Vec<TextLeaf>) -> Self {
        Self { kind, leaves }
    }

    pub fn text(&self) -> String {
        self.leaves.iter().map(|l| l.text.as_str()).collect()
    }
}

/// Root of one rendered lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedContent {
    blocks: Vec<ContentBlock>,
}

impl RenderedContent {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self { blocks }
    }

    pub fn from_html(html: &str) -> Self {
        Self::new(html_to_blocks(html))
    }

    pub fn from_text(text: &str, markdown: bool) -> Self {
        Self::new(text_to_blocks(text, markdown))
    }

    /// Picks the parser from the file extension.
    pub fn open(path: &Path) -> Result<Self, ContentError> {
        let source = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        Ok(match ext.as_deref() {
            Some("html") | Some("htm") | Some("xhtml") => Self::from_html(&source),
            Some("md") | Some("markdown") => Self::from_text(&source, true),
            _ => Self::from_text(&source, false),
        })
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Text leaves in document order as `(block, leaf, leaf_ref)`.
    pub fn leaves(&self) -> impl Iterator<Item = (usize, usize, &TextLeaf)> {
        self.blocks.iter().enumerate().flat_map(|(b, block)| {
            block
                .leaves
                .iter()
                .enumerate()
                .map(move |(l, leaf)| (b, l, leaf))
        })
    }

    pub fn title(&self) -> Option<String> {
        self.blocks
            .iter()
            .find(|b| matches!(b.kind, BlockKind::Heading(_)))
            .map(|b| b.text().trim().to_string())
            .filter(|t| !t.is_empty())
    }
}
