//! Front door of the mark engine. Every user interaction and every content
//! mount goes through [`SelectionController`], which owns the per-lesson
//! collections, the decoration layer and the selection state machine.

mod machine;
#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::apply::{ApplyError, ApplyMode, MarkLayer};
use crate::collection::LessonMarks;
use crate::color::RgbColor;
use crate::config::Settings;
use crate::content::RenderedContent;
use crate::error::MarkError;
use crate::locate::{locate, occurrence_of, relocate};
use crate::restore::{self, RestoreReport};
use crate::segments::SegmentModel;
use crate::store::MarkStore;
use crate::types::{Annotation, Highlight, LessonKey, TextRange};

pub use machine::{
    transition, AnnotationDraft, Context, Effect, Event, Mode, ScreenAnchor, Selection, State,
};

/// Result of one handled event, for the UI to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    ModeChanged(Mode),
    HighlightCreated(String),
    HighlightRemoved(String),
    HighlightReplaced { removed: Vec<String>, created: String },
    /// Create-mode application was refused; nothing was stored.
    Rejected(ApplyError),
    ComposerOpened { existing: Option<String> },
    AnnotationSaved { id: String, created: bool },
    AnnotationDiscarded,
}

pub struct SelectionController<S: MarkStore> {
    store: S,
    settings: Settings,
    active_color: RgbColor,
    marks: LessonMarks,
    model: SegmentModel,
    layer: MarkLayer,
    state: State,
}

impl<S: MarkStore> SelectionController<S> {
    /// Starts with empty collections for `key`; call [`Self::open_lesson`] to
    /// load what the store holds.
    pub fn new(store: S, key: LessonKey, settings: Settings) -> Self {
        Self {
            store,
            active_color: settings.active_color,
            settings,
            marks: LessonMarks::empty(key),
            model: SegmentModel::default(),
            layer: MarkLayer::new(),
            state: State::Idle,
        }
    }

    /// Loads the lesson's collections and drops whatever was mounted. Highlight
    /// mode survives a lesson switch, an open draft does not.
    pub fn open_lesson(&mut self, key: LessonKey) -> Result<(), MarkError> {
        info!(subject = %key.subject_id, lesson = %key.lesson_id, "opening lesson");
        if matches!(self.state, State::AnnotationComposing(_)) {
            self.state = State::Idle;
        }
        self.model = SegmentModel::default();
        self.layer.clear();
        match LessonMarks::load(&self.store, key.clone()) {
            Ok(marks) => {
                self.marks = marks;
                Ok(())
            }
            Err(e) => {
                self.marks = LessonMarks::empty(key);
                Err(e.into())
            }
        }
    }

    /// Rebuilds the segment model for freshly rendered content and restores
    /// every persisted mark onto it.
    pub fn mount(&mut self, content: &RenderedContent) -> RestoreReport {
        self.model = SegmentModel::build(content);
        self.layer.clear();
        self.restore()
    }

    /// Re-runs restoration against the current render; a no-op for marks
    /// already shown.
    pub fn restore(&mut self) -> RestoreReport {
        restore::run(
            &self.model,
            &mut self.layer,
            self.marks.highlights(),
            self.marks.annotations(),
            self.marks.lesson_id(),
        )
    }

    /// Accepts a palette name or a color value.
    pub fn set_active_color(&mut self, color: &str) -> Result<RgbColor, MarkError> {
        let resolved = self.settings.palette.resolve(color)?;
        self.active_color = resolved;
        Ok(resolved)
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<Outcome, MarkError> {
        self.dispatch(Event::SetMode(mode))
    }

    pub fn on_selection_event(&mut self, selection: Selection) -> Result<Outcome, MarkError> {
        self.dispatch(Event::Select(selection))
    }

    /// Convenience for hosts that only know a stream range.
    pub fn select_range(
        &mut self,
        range: TextRange,
        anchor: ScreenAnchor,
    ) -> Result<Outcome, MarkError> {
        match Selection::from_model(&self.model, range, anchor) {
            Some(selection) => self.on_selection_event(selection),
            None => Ok(Outcome::Ignored),
        }
    }

    pub fn on_indicator_click(&mut self, annotation_id: &str) -> Result<Outcome, MarkError> {
        self.dispatch(Event::IndicatorClicked(annotation_id.to_string()))
    }

    pub fn save_annotation<I, T>(&mut self, tags: I, comment: &str) -> Result<Outcome, MarkError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        self.dispatch(Event::Save {
            tags,
            comment: comment.to_string(),
        })
    }

    pub fn cancel_annotation(&mut self) -> Result<Outcome, MarkError> {
        self.dispatch(Event::Cancel)
    }

    pub fn remove_highlight(&mut self, id: &str) -> Result<(), MarkError> {
        if self.marks.remove_highlight(id).is_none() {
            return Err(MarkError::UnknownMark(id.to_string()));
        }
        self.layer.remove_highlight(id);
        self.marks.save_highlights(&mut self.store)?;
        Ok(())
    }

    pub fn remove_annotation(&mut self, id: &str) -> Result<(), MarkError> {
        if self.marks.remove_annotation(id).is_none() {
            return Err(MarkError::UnknownMark(id.to_string()));
        }
        self.layer.remove_indicator(id);
        if self
            .state
            .draft()
            .is_some_and(|d| d.id.as_deref() == Some(id))
        {
            self.state = State::Idle;
        }
        self.marks.save_annotations(&mut self.store)?;
        Ok(())
    }

    /// Highlights stored for `lesson_id` in the current subject. The open
    /// lesson answers from memory, others are read from the store.
    pub fn highlights(&self, lesson_id: &str) -> Result<Vec<Highlight>, MarkError> {
        if lesson_id == self.marks.lesson_id() {
            return Ok(self.marks.highlights().to_vec());
        }
        let other = LessonMarks::load(&self.store, self.marks.key().sibling(lesson_id))?;
        Ok(other.highlights().to_vec())
    }

    pub fn annotations(&self, lesson_id: &str) -> Result<Vec<Annotation>, MarkError> {
        let records = if lesson_id == self.marks.lesson_id() {
            self.marks.annotations().to_vec()
        } else {
            LessonMarks::load(&self.store, self.marks.key().sibling(lesson_id))?
                .annotations()
                .to_vec()
        };
        Ok(records
            .into_iter()
            .filter(|a| a.lesson_id == lesson_id)
            .collect())
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn draft(&self) -> Option<&AnnotationDraft> {
        self.state.draft()
    }

    pub fn layer(&self) -> &MarkLayer {
        &self.layer
    }

    pub fn model(&self) -> &SegmentModel {
        &self.model
    }

    pub fn marks(&self) -> &LessonMarks {
        &self.marks
    }

    pub fn key(&self) -> &LessonKey {
        self.marks.key()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn active_color(&self) -> RgbColor {
        self.active_color
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn dispatch(&mut self, event: Event) -> Result<Outcome, MarkError> {
        let ctx = Context {
            marks: &self.marks,
            layer: &self.layer,
            active_color: self.active_color,
        };
        let (next, effects) = transition(std::mem::take(&mut self.state), event, &ctx);
        self.state = next;
        let mut outcome = Outcome::Ignored;
        for effect in effects {
            outcome = self.execute(effect)?;
        }
        Ok(outcome)
    }

    fn execute(&mut self, effect: Effect) -> Result<Outcome, MarkError> {
        match effect {
            Effect::ModeChanged(mode) => {
                debug!(?mode, "mode changed");
                Ok(Outcome::ModeChanged(mode))
            }
            Effect::OpenComposer { existing } => Ok(Outcome::ComposerOpened { existing }),
            Effect::DiscardDraft => Ok(Outcome::AnnotationDiscarded),
            Effect::RemoveHighlight(id) => {
                self.layer.remove_highlight(&id);
                self.marks.remove_highlight(&id);
                self.marks.save_highlights(&mut self.store)?;
                Ok(Outcome::HighlightRemoved(id))
            }
            Effect::CreateHighlight { text, range, color } => {
                match self.create_highlight(text, range, color) {
                    Ok(id) => {
                        self.marks.save_highlights(&mut self.store)?;
                        Ok(Outcome::HighlightCreated(id))
                    }
                    Err(e) => Ok(Outcome::Rejected(e)),
                }
            }
            Effect::ReplaceHighlights {
                remove,
                text,
                range,
                color,
            } => {
                for id in &remove {
                    self.layer.remove_highlight(id);
                    self.marks.remove_highlight(id);
                }
                let outcome = match self.create_highlight(text, range, color) {
                    Ok(created) => Outcome::HighlightReplaced {
                        removed: remove,
                        created,
                    },
                    Err(e) => {
                        warn!("replacement highlight refused: {e}");
                        Outcome::Rejected(e)
                    }
                };
                self.marks.save_highlights(&mut self.store)?;
                Ok(outcome)
            }
            Effect::CommitAnnotation(draft) => self.commit_annotation(draft),
        }
    }

    // Applies first so a refused wrapper never leaves a record behind.
    fn create_highlight(
        &mut self,
        text: String,
        range: TextRange,
        color: RgbColor,
    ) -> Result<String, ApplyError> {
        let occurrence = occurrence_of(&self.model, range).unwrap_or(0);
        let record = Highlight::new(self.marks.lesson_id(), text, color, occurrence);
        self.layer
            .apply_highlight(&self.model, range, &record.id, color, ApplyMode::Create)?;
        let id = record.id.clone();
        self.marks.push_highlight(record);
        Ok(id)
    }

    fn commit_annotation(&mut self, draft: AnnotationDraft) -> Result<Outcome, MarkError> {
        let existing = draft
            .id
            .as_deref()
            .and_then(|id| self.marks.annotation_mut(id));
        let (id, created) = match existing {
            Some(record) => {
                record.tags = draft.tags;
                record.comment = draft.comment;
                (record.id.clone(), false)
            }
            None => {
                let range = match draft.range {
                    Some(range) => range,
                    None => locate(&self.model, &draft.text, 0)?,
                };
                let occurrence = occurrence_of(&self.model, range).unwrap_or(0);
                let mut record =
                    Annotation::new(self.marks.lesson_id(), draft.text, range, occurrence);
                record.tags = draft.tags;
                record.comment = draft.comment;
                let id = record.id.clone();
                self.marks.push_annotation(record);
                (id, true)
            }
        };
        self.show_indicator(&id);
        self.marks.save_annotations(&mut self.store)?;
        Ok(Outcome::AnnotationSaved { id, created })
    }

    fn show_indicator(&mut self, id: &str) {
        if self.layer.has_indicator(id) {
            return;
        }
        let Some(record) = self.marks.annotation(id) else {
            return;
        };
        match relocate(&self.model, &record.text, record.occurrence) {
            Ok(range) => {
                self.layer.insert_indicator(range.end, id);
            }
            Err(e) => debug!(id, "annotation anchor not shown: {e}"),
        }
    }
}
