//! Pure selection state machine. `transition` decides; the controller executes
//! the returned effects against the layer, the collections and the store.

use std::collections::BTreeSet;

use crate::apply::MarkLayer;
use crate::collection::LessonMarks;
use crate::color::RgbColor;
use crate::overlap::{classify, Classification};
use crate::segments::SegmentModel;
use crate::types::{is_complete, normalize_tags, TextRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Selections open the annotation composer.
    #[default]
    Idle,
    /// Selections toggle, extend or create highlights.
    Highlight,
}

/// Terminal cell a popover should be anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenAnchor {
    pub column: u16,
    pub row: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub text: String,
    pub range: TextRange,
    pub anchor: ScreenAnchor,
}

impl Selection {
    /// Selection over `range`, trimmed to its non-whitespace bounds. `None`
    /// when nothing but whitespace is selected.
    pub fn from_model(model: &SegmentModel, range: TextRange, anchor: ScreenAnchor) -> Option<Self> {
        let raw = model.slice(range)?;
        let start = range.start + (raw.len() - raw.trim_start().len());
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            range: TextRange::new(start, start + text.len()),
            anchor,
        })
    }

    /// Selection over the `occurrence`-th match of `text`.
    pub fn find(model: &SegmentModel, text: &str, occurrence: usize) -> Option<Self> {
        let range = crate::locate::locate(model, text, occurrence).ok()?;
        Self::from_model(model, range, ScreenAnchor::default())
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty() || self.range.is_empty()
    }
}

/// Annotation being composed. `id` is set when editing an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotationDraft {
    pub id: Option<String>,
    pub text: String,
    pub range: Option<TextRange>,
    pub anchor: ScreenAnchor,
    pub tags: BTreeSet<String>,
    pub comment: String,
}

impl AnnotationDraft {
    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Idle,
    HighlightMode,
    AnnotationComposing(AnnotationDraft),
}

impl State {
    /// The annotation popover reacts to selections only outside highlight mode.
    pub fn popover_enabled(&self) -> bool {
        !matches!(self, State::HighlightMode)
    }

    pub fn mode(&self) -> Mode {
        match self {
            State::HighlightMode => Mode::Highlight,
            _ => Mode::Idle,
        }
    }

    pub fn draft(&self) -> Option<&AnnotationDraft> {
        match self {
            State::AnnotationComposing(draft) => Some(draft),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SetMode(Mode),
    Select(Selection),
    IndicatorClicked(String),
    Save {
        tags: BTreeSet<String>,
        comment: String,
    },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ModeChanged(Mode),
    RemoveHighlight(String),
    CreateHighlight {
        text: String,
        range: TextRange,
        color: RgbColor,
    },
    ReplaceHighlights {
        remove: Vec<String>,
        text: String,
        range: TextRange,
        color: RgbColor,
    },
    OpenComposer {
        existing: Option<String>,
    },
    CommitAnnotation(AnnotationDraft),
    DiscardDraft,
}

/// What `transition` may look at besides the state itself.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub marks: &'a LessonMarks,
    pub layer: &'a MarkLayer,
    pub active_color: RgbColor,
}

pub fn transition(state: State, event: Event, ctx: &Context<'_>) -> (State, Vec<Effect>) {
    match (state, event) {
        (State::Idle, Event::SetMode(Mode::Highlight)) => (
            State::HighlightMode,
            vec![Effect::ModeChanged(Mode::Highlight)],
        ),
        (State::HighlightMode, Event::SetMode(Mode::Idle)) => {
            (State::Idle, vec![Effect::ModeChanged(Mode::Idle)])
        }
        (State::AnnotationComposing(_), Event::SetMode(Mode::Highlight)) => (
            State::HighlightMode,
            vec![Effect::DiscardDraft, Effect::ModeChanged(Mode::Highlight)],
        ),

        (State::HighlightMode, Event::Select(sel)) if !sel.is_blank() => {
            (State::HighlightMode, vec![highlight_effect(sel, ctx)])
        }
        (State::Idle, Event::Select(sel)) if !sel.is_blank() => {
            let draft = match ctx.marks.annotation_by_text(&sel.text) {
                Some(existing) => AnnotationDraft {
                    id: Some(existing.id.clone()),
                    text: sel.text,
                    range: Some(sel.range),
                    anchor: sel.anchor,
                    tags: existing.tags.clone(),
                    comment: existing.comment.clone(),
                },
                None => AnnotationDraft {
                    id: None,
                    text: sel.text,
                    range: Some(sel.range),
                    anchor: sel.anchor,
                    ..AnnotationDraft::default()
                },
            };
            let existing = draft.id.clone();
            (
                State::AnnotationComposing(draft),
                vec![Effect::OpenComposer { existing }],
            )
        }
        (State::Idle, Event::IndicatorClicked(id)) => match ctx.marks.annotation(&id) {
            Some(existing) => {
                let draft = AnnotationDraft {
                    id: Some(existing.id.clone()),
                    text: existing.text.clone(),
                    range: None,
                    anchor: ScreenAnchor::default(),
                    tags: existing.tags.clone(),
                    comment: existing.comment.clone(),
                };
                (
                    State::AnnotationComposing(draft),
                    vec![Effect::OpenComposer { existing: Some(id) }],
                )
            }
            None => (State::Idle, Vec::new()),
        },

        (State::AnnotationComposing(mut draft), Event::Save { tags, comment }) => {
            let tags = normalize_tags(tags);
            if !is_complete(&tags, &comment) {
                return (State::Idle, vec![Effect::DiscardDraft]);
            }
            draft.tags = tags;
            draft.comment = comment;
            (State::Idle, vec![Effect::CommitAnnotation(draft)])
        }
        (State::AnnotationComposing(_), Event::Cancel) => (State::Idle, vec![Effect::DiscardDraft]),

        // Same-mode toggles, blank selections, selections while composing and
        // stray save/cancel events change nothing.
        (state, _) => (state, Vec::new()),
    }
}

fn highlight_effect(sel: Selection, ctx: &Context<'_>) -> Effect {
    match classify(&sel.text, sel.range, ctx.layer) {
        Classification::ExactMatch(id) => Effect::RemoveHighlight(id),
        Classification::Overlap { id, also } => {
            let color = ctx
                .layer
                .highlight(&id)
                .map(|w| w.background)
                .unwrap_or(ctx.active_color);
            let mut remove = vec![id];
            remove.extend(also);
            Effect::ReplaceHighlights {
                remove,
                text: sel.text,
                range: sel.range,
                color,
            }
        }
        Classification::None => Effect::CreateHighlight {
            text: sel.text,
            range: sel.range,
            color: ctx.active_color,
        },
    }
}
