use lesson_core::controller::{Mode, Outcome, SelectionController};
use lesson_core::store::MarkStore;
use lesson_core::MarkError;
use tracing::warn;

use crate::composer::Composer;
use crate::lesson_view::LessonView;
use crate::theme::Theme;

use super::types::{CursorTarget, Drag, Lesson};

pub struct App<S: MarkStore> {
    pub(super) controller: SelectionController<S>,
    pub(super) lessons: Vec<Lesson>,
    pub(super) current: usize,
    pub(super) view: LessonView,
    pub(super) composer: Option<Composer>,
    pub(super) cursor: Option<CursorTarget>,
    pub(super) drag: Option<Drag>,
    pub(super) notice: Option<String>,
    pub(super) show_help: bool,
    pub(super) theme: Theme,
}

impl<S: MarkStore> App<S> {
    /// Opens the first lesson right away.
    pub fn new(controller: SelectionController<S>, lessons: Vec<Lesson>) -> Self {
        let mut app = Self {
            controller,
            lessons,
            current: 0,
            view: LessonView::new(),
            composer: None,
            cursor: None,
            drag: None,
            notice: None,
            show_help: false,
            theme: Theme::default(),
        };
        app.open_lesson(0);
        app
    }

    pub fn controller(&self) -> &SelectionController<S> {
        &self.controller
    }

    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.lessons.get(self.current)
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub(super) fn open_lesson(&mut self, index: usize) {
        let Some(lesson) = self.lessons.get(index) else {
            return;
        };
        self.current = index;
        self.composer = None;
        self.cursor = None;
        self.drag = None;
        let opened = self.controller.open_lesson(lesson.key.clone());
        let report = self.controller.mount(&lesson.content);
        self.view.reset();
        self.view.title = Some(format!(" {} ", lesson.title));
        self.notice = None;
        let unreadable = self.controller.marks().unreadable_count();
        if let Err(e) = opened {
            self.report_error(&e);
        } else if unreadable > 0 {
            self.notice = Some(format!("{unreadable} stored mark(s) could not be read"));
        } else if !report.orphaned.is_empty() {
            self.notice = Some(format!(
                "{} mark(s) could not be placed in this lesson",
                report.orphaned.len()
            ));
        }
    }

    pub(super) fn handle(&mut self, result: Result<Outcome, MarkError>) {
        match result {
            Ok(outcome) => self.report(outcome),
            Err(e) => self.report_error(&e),
        }
        if self.controller.draft().is_none() {
            self.composer = None;
        }
        self.view.invalidate();
    }

    fn report(&mut self, outcome: Outcome) {
        let notice = match outcome {
            Outcome::Ignored => return,
            Outcome::ModeChanged(Mode::Highlight) => "highlight mode: select text to mark it".into(),
            Outcome::ModeChanged(Mode::Idle) => "annotate mode: select text to annotate".into(),
            Outcome::HighlightCreated(_) => "highlighted".into(),
            Outcome::HighlightRemoved(_) => "highlight removed".into(),
            Outcome::HighlightReplaced { removed, .. } => {
                format!("highlight extended over {} old mark(s)", removed.len())
            }
            Outcome::Rejected(e) => format!("not highlighted: {e}"),
            Outcome::ComposerOpened { .. } => {
                self.composer = self.controller.draft().map(Composer::from_draft);
                return;
            }
            Outcome::AnnotationSaved { created: true, .. } => "annotation saved".into(),
            Outcome::AnnotationSaved { created: false, .. } => "annotation updated".into(),
            Outcome::AnnotationDiscarded => "annotation discarded".into(),
        };
        self.notice = Some(notice);
    }

    pub(super) fn report_error(&mut self, error: &MarkError) {
        warn!("mark operation failed: {error}");
        self.notice = Some(if error.is_persistence() {
            format!("not saved: {error}")
        } else {
            error.to_string()
        });
    }
}
