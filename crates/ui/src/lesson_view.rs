mod wrap;


use lesson_core::apply::MarkLayer;
use lesson_core::content::{BlockKind, RenderedContent};
use lesson_core::{SegmentModel, TextRange};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::layout::rect_contains;
use crate::theme::{rgb, Theme};

pub use wrap::{layout_lines, Cell, CellKind, ViewLine};

pub const DEFAULT_COLUMN_WIDTH: u16 = 72;
const MIN_COLUMN_WIDTH: u16 = 24;

/// What a mouse position lands on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hit {
    /// Grapheme at stream bytes `start..end`.
    Text { start: usize, end: usize },
    Indicator(String),
}

pub struct LessonView {
    pub lines: Vec<ViewLine>,
    pub scroll: usize,
    pub column_width: u16,
    /// Live drag selection, as a stream range.
    pub selection: Option<TextRange>,
    pub title: Option<String>,
    laid_out_width: usize,
    dirty: bool,
}

impl Default for LessonView {
    fn default() -> Self {
        Self::new()
    }
}

impl LessonView {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            scroll: 0,
            column_width: DEFAULT_COLUMN_WIDTH,
            selection: None,
            title: None,
            laid_out_width: 0,
            dirty: true,
        }
    }

    /// Forces a re-layout on the next [`Self::reflow`].
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn adjust_width(&mut self, delta: i16) {
        let width = (self.column_width as i32 + delta as i32).max(MIN_COLUMN_WIDTH as i32);
        self.column_width = width.min(u16::MAX as i32) as u16;
        self.dirty = true;
    }

    pub fn reflow(
        &mut self,
        content: &RenderedContent,
        model: &SegmentModel,
        layer: &MarkLayer,
        glyph: &str,
        width: usize,
    ) {
        if !self.dirty && width == self.laid_out_width {
            return;
        }
        self.lines = layout_lines(content, model, layer, glyph, width);
        self.laid_out_width = width;
        self.dirty = false;
        self.scroll = self.scroll.min(self.lines.len().saturating_sub(1));
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.lines.len().saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    pub fn reset(&mut self) {
        self.scroll = 0;
        self.selection = None;
        self.dirty = true;
    }

    /// Text column inside the frame: a centered box `column_width` wide
    /// between the title row and the status bar.
    pub fn content_area(&self, frame: Rect) -> Rect {
        let body = Rect {
            y: frame.y.saturating_add(1).min(frame.y + frame.height),
            height: frame.height.saturating_sub(2),
            ..frame
        };
        let col_w = self.column_width.saturating_add(2).min(body.width);
        let left_pad = body.width.saturating_sub(col_w) / 2;
        Rect {
            x: body.x + left_pad + 1,
            width: col_w.saturating_sub(2),
            ..body
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, frame: Rect, layer: &MarkLayer, theme: &Theme) {
        let area = self.content_area(frame);
        let outer = Rect {
            x: area.x.saturating_sub(1),
            y: area.y.saturating_sub(1),
            width: area.width + 2,
            height: area.height + 1,
        }
        .intersection(frame);
        let mut block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(theme.quote_fg));
        if let Some(title) = &self.title {
            block = block.title(title.as_str());
        }
        f.render_widget(block, outer);
        let lines: Vec<Line<'static>> = self
            .lines
            .iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .map(|line| self.styled_line(line, layer, theme))
            .collect();
        f.render_widget(Paragraph::new(lines), area);
    }

    pub(crate) fn styled_line(
        &self,
        line: &ViewLine,
        layer: &MarkLayer,
        theme: &Theme,
    ) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut run = String::new();
        let mut run_style: Option<Style> = None;
        for cell in &line.cells {
            let style = self.cell_style(cell, layer, theme);
            if run_style != Some(style) {
                if let Some(prev) = run_style {
                    spans.push(Span::styled(std::mem::take(&mut run), prev));
                }
                run_style = Some(style);
            }
            run.push_str(&cell.text);
        }
        if let Some(style) = run_style {
            spans.push(Span::styled(run, style));
        }
        Line::from(spans)
    }

    fn cell_style(&self, cell: &Cell, layer: &MarkLayer, theme: &Theme) -> Style {
        match &cell.kind {
            CellKind::Gutter => Style::default().fg(theme.quote_fg),
            CellKind::Indicator(_) => theme.indicator_style(),
            CellKind::Text {
                offset,
                style,
                block,
            } => {
                if self.selection.is_some_and(|s| s.contains(*offset)) {
                    return theme.selection_style();
                }
                let mut out = Style::default();
                match block {
                    BlockKind::Heading(_) => {
                        out = out.fg(theme.heading_fg).add_modifier(Modifier::BOLD);
                    }
                    BlockKind::Quote => out = out.add_modifier(Modifier::ITALIC),
                    BlockKind::Code => out = out.fg(theme.code_fg),
                    _ => {}
                }
                if style.bold {
                    out = out.add_modifier(Modifier::BOLD);
                }
                if style.italic {
                    out = out.add_modifier(Modifier::ITALIC);
                }
                if style.code {
                    out = out.fg(theme.code_fg);
                }
                if let Some(mark) = layer.highlight_at(*offset) {
                    out = out.bg(rgb(mark.background)).fg(rgb(mark.foreground));
                }
                out
            }
        }
    }

    /// Maps a mouse position to the cell under it. Positions right of a
    /// line's end snap to its last grapheme, the way a text selection does.
    pub fn hit(&self, frame: Rect, column: u16, row: u16) -> Option<Hit> {
        let area = self.content_area(frame);
        if !rect_contains(area, column, row) {
            return None;
        }
        let line = self.lines.get(self.scroll + (row - area.y) as usize)?;
        let col = (column - area.x) as usize;
        let cell = line.cells.get(col);
        match cell.map(|c| &c.kind) {
            Some(CellKind::Indicator(id)) => Some(Hit::Indicator(id.clone())),
            Some(CellKind::Text { .. }) => cell.and_then(cell_hit),
            Some(CellKind::Gutter) => line.cells.iter().skip(col).find_map(cell_hit),
            None => line.cells.iter().rev().find_map(cell_hit),
        }
    }
}

fn cell_hit(cell: &Cell) -> Option<Hit> {
    cell.span().map(|(start, end)| Hit::Text { start, end })
}
