use std::collections::BTreeSet;

use lesson_core::controller::AnnotationDraft;
use lesson_core::types::parse_tag_line;
use ratatui::{prelude::*, widgets::*};
use unicode_segmentation::UnicodeSegmentation;

use crate::layout::anchored_rect;
use crate::theme::Theme;

const POPOVER_WIDTH: u16 = 48;
const POPOVER_HEIGHT: u16 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Tags,
    Comment,
}

/// Annotation popover: a tag line and a comment line.
pub struct Composer {
    pub anchor_text: String,
    pub tags: String,
    pub comment: String,
    pub field: Field,
    pub editing: bool,
    column: u16,
    row: u16,
}

impl Composer {
    pub fn from_draft(draft: &AnnotationDraft) -> Self {
        Self {
            anchor_text: draft.text.clone(),
            tags: draft.tags.iter().cloned().collect::<Vec<_>>().join(", "),
            comment: draft.comment.clone(),
            field: Field::Tags,
            editing: draft.is_edit(),
            column: draft.anchor.column,
            row: draft.anchor.row,
        }
    }

    /// Moves the popover next to a screen cell, e.g. a clicked indicator.
    pub fn place(&mut self, column: u16, row: u16) {
        self.column = column;
        self.row = row;
    }

    pub fn switch_field(&mut self) {
        self.field = match self.field {
            Field::Tags => Field::Comment,
            Field::Comment => Field::Tags,
        };
    }

    pub fn insert(&mut self, c: char) {
        self.active_mut().push(c);
    }

    pub fn backspace(&mut self) {
        let buf = self.active_mut();
        let last = buf.grapheme_indices(true).next_back().map(|(idx, _)| idx);
        if let Some(idx) = last {
            buf.truncate(idx);
        }
    }

    pub fn parsed_tags(&self) -> BTreeSet<String> {
        parse_tag_line(&self.tags)
    }

    fn active_mut(&mut self) -> &mut String {
        match self.field {
            Field::Tags => &mut self.tags,
            Field::Comment => &mut self.comment,
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect, theme: &Theme) {
        let popup = anchored_rect(self.column, self.row, POPOVER_WIDTH, POPOVER_HEIGHT, area);
        let title = if self.editing {
            "Edit annotation (Tab field, Enter save, Esc cancel)"
        } else {
            "Annotate (Tab field, Enter save, Esc cancel)"
        };
        let field_style = |field: Field| {
            if self.field == field {
                Style::default().fg(theme.mode_annotate).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.quote_fg)
            }
        };
        let cursor = |field: Field| if self.field == field { "▏" } else { "" };
        let lines = vec![
            Line::from(Span::styled(
                format!("“{}”", self.anchor_text),
                Style::default().add_modifier(Modifier::ITALIC),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Tags:    ", field_style(Field::Tags)),
                Span::raw(format!("{}{}", self.tags, cursor(Field::Tags))),
            ]),
            Line::from(vec![
                Span::styled("Comment: ", field_style(Field::Comment)),
                Span::raw(format!("{}{}", self.comment, cursor(Field::Comment))),
            ]),
        ];
        let body = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.indicator_fg)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(Clear, popup);
        f.render_widget(body, popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::controller::ScreenAnchor;

    fn draft() -> AnnotationDraft {
        AnnotationDraft {
            id: Some("a1".into()),
            text: "osmosis".into(),
            range: None,
            anchor: ScreenAnchor { column: 3, row: 4 },
            tags: ["exam".to_string(), "bio".to_string()].into_iter().collect(),
            comment: "passive".into(),
        }
    }

    #[test]
    fn prefills_from_existing_annotation() {
        let composer = Composer::from_draft(&draft());
        assert!(composer.editing);
        assert_eq!(composer.tags, "bio, exam");
        assert_eq!(composer.comment, "passive");
    }

    #[test]
    fn typing_goes_to_the_active_field() {
        let mut composer = Composer::from_draft(&AnnotationDraft::default());
        for c in "a, b".chars() {
            composer.insert(c);
        }
        composer.switch_field();
        for c in "note".chars() {
            composer.insert(c);
        }
        composer.backspace();
        assert_eq!(composer.comment, "not");
        let tags: Vec<String> = composer.parsed_tags().into_iter().collect();
        assert_eq!(tags, vec!["a", "b"]);
    }
}
