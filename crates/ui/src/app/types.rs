use lesson_core::{LessonKey, RenderedContent};

/// One lesson the viewer can switch to.
pub struct Lesson {
    pub key: LessonKey,
    pub title: String,
    pub content: RenderedContent,
}

impl Lesson {
    /// Title falls back to the lesson id when the content has no heading.
    pub fn new(key: LessonKey, content: RenderedContent) -> Self {
        let title = content.title().unwrap_or_else(|| key.lesson_id.clone());
        Self {
            key,
            title,
            content,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ComposerCommand {
    Cancel,
    Save,
    SwitchField,
    Backspace,
    Insert(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Command {
    Exit,
    Cancel,
    ToggleHelp,
    CloseHelp,
    ToggleMode,
    PickColor(usize),
    RemoveAtCursor,
    NextLesson,
    PrevLesson,
    ScrollDown(usize),
    ScrollUp(usize),
    PageDown,
    PageUp,
    AdjustWidth(i16),
    Composer(ComposerCommand),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CommandOutcome {
    Continue,
    Exit,
}

/// Last thing the user clicked, target of `x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum CursorTarget {
    Text(usize),
    Indicator(String),
}

/// Mouse drag in progress; both ends are grapheme byte ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct Drag {
    pub anchor: (usize, usize),
    pub head: (usize, usize),
    pub moved: bool,
}

impl Drag {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            anchor: (start, end),
            head: (start, end),
            moved: false,
        }
    }

    pub fn range(&self) -> lesson_core::TextRange {
        lesson_core::TextRange::new(
            self.anchor.0.min(self.head.0),
            self.anchor.1.max(self.head.1),
        )
    }
}
