use lesson_core::apply::MarkLayer;
use lesson_core::content::{BlockKind, InlineStyle, RenderedContent};
use lesson_core::SegmentModel;
use unicode_segmentation::UnicodeSegmentation;

/// One terminal column of the laid out lesson.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub kind: CellKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellKind {
    /// A grapheme of the lesson text stream starting at `offset`.
    Text {
        offset: usize,
        style: InlineStyle,
        block: BlockKind,
    },
    /// Marker drawn after an annotation's anchor text.
    Indicator(String),
    /// Bullets, quote bars and continuation indents.
    Gutter,
}

impl Cell {
    fn gutter(text: &str) -> Self {
        Self {
            text: text.to_string(),
            kind: CellKind::Gutter,
        }
    }

    /// Byte range of the grapheme in the lesson text stream.
    pub fn span(&self) -> Option<(usize, usize)> {
        match self.kind {
            CellKind::Text { offset, .. } => Some((offset, offset + self.text.len())),
            _ => None,
        }
    }

    fn is_space(&self) -> bool {
        matches!(self.kind, CellKind::Text { .. }) && self.text.trim().is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewLine {
    pub cells: Vec<Cell>,
}

impl ViewLine {
    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }
}

fn gutter_for(kind: BlockKind) -> (&'static str, &'static str) {
    match kind {
        BlockKind::ListItem => ("• ", "  "),
        BlockKind::Quote => ("│ ", "│ "),
        BlockKind::Code => ("  ", "  "),
        _ => ("", ""),
    }
}

/// Wraps every block of `content` to `width` columns, one grapheme per
/// column, with a blank line between blocks. Indicator glyphs are placed
/// right after the grapheme their annotation ends on.
pub fn layout_lines(
    content: &RenderedContent,
    model: &SegmentModel,
    layer: &MarkLayer,
    glyph: &str,
    width: usize,
) -> Vec<ViewLine> {
    let mut lines: Vec<ViewLine> = Vec::new();
    for (block_idx, block) in content.blocks().iter().enumerate() {
        let mut cells: Vec<Cell> = Vec::new();
        for seg in model.segments_in_block(block_idx) {
            let style = block
                .leaves
                .get(seg.leaf)
                .map(|l| l.style)
                .unwrap_or_default();
            for (idx, g) in seg.text.grapheme_indices(true) {
                let offset = seg.start + idx;
                cells.push(Cell {
                    text: g.to_string(),
                    kind: CellKind::Text {
                        offset,
                        style,
                        block: block.kind,
                    },
                });
                for indicator in layer.indicators_at(offset + g.len()) {
                    cells.push(Cell {
                        text: glyph.to_string(),
                        kind: CellKind::Indicator(indicator.annotation_id.clone()),
                    });
                }
            }
        }
        if cells.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(ViewLine::default());
        }
        let (first, rest) = gutter_for(block.kind);
        wrap_cells(cells, first, rest, width, &mut lines);
    }
    lines
}

fn wrap_cells(cells: Vec<Cell>, first: &str, rest: &str, width: usize, out: &mut Vec<ViewLine>) {
    let avail = width
        .saturating_sub(first.graphemes(true).count().max(rest.graphemes(true).count()))
        .max(1);
    let start_line = |gutter: &str| ViewLine {
        cells: gutter.graphemes(true).map(Cell::gutter).collect(),
    };

    let mut line = start_line(first);
    let mut used = 0;
    for (body, trailing) in words(cells) {
        if used > 0 && used + body.len() > avail {
            out.push(std::mem::replace(&mut line, start_line(rest)));
            used = 0;
        }
        for cell in body {
            if used == avail {
                out.push(std::mem::replace(&mut line, start_line(rest)));
                used = 0;
            }
            line.cells.push(cell);
            used += 1;
        }
        for cell in trailing {
            if used < avail {
                line.cells.push(cell);
                used += 1;
            }
        }
    }
    out.push(line);
}

// Splits into (word, following whitespace) pairs.
fn words(cells: Vec<Cell>) -> Vec<(Vec<Cell>, Vec<Cell>)> {
    let mut out: Vec<(Vec<Cell>, Vec<Cell>)> = Vec::new();
    let mut body = Vec::new();
    let mut trailing = Vec::new();
    for cell in cells {
        if cell.is_space() {
            trailing.push(cell);
        } else {
            if !trailing.is_empty() {
                out.push((std::mem::take(&mut body), std::mem::take(&mut trailing)));
            }
            body.push(cell);
        }
    }
    if !body.is_empty() || !trailing.is_empty() {
        out.push((body, trailing));
    }
    out
}
