use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use lesson_core::controller::Mode;
use lesson_core::store::MarkStore;

use super::types::{Command, CommandOutcome, ComposerCommand, CursorTarget};
use super::App;

// A click on the last grapheme of an annotated run (up to 4 bytes) still
// reaches the marker sitting after it.
const INDICATOR_SLACK: usize = 4;

impl Command {
    pub(super) fn from_key<S: MarkStore>(app: &App<S>, key: KeyEvent) -> Option<Self> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Some(Command::Exit);
        }
        if app.composer.is_some() {
            return match key.code {
                KeyCode::Esc => Some(Command::Composer(ComposerCommand::Cancel)),
                KeyCode::Enter => Some(Command::Composer(ComposerCommand::Save)),
                KeyCode::Tab | KeyCode::BackTab => {
                    Some(Command::Composer(ComposerCommand::SwitchField))
                }
                KeyCode::Backspace => Some(Command::Composer(ComposerCommand::Backspace)),
                KeyCode::Char(c) if !ctrl => Some(Command::Composer(ComposerCommand::Insert(c))),
                _ => None,
            };
        }
        if app.show_help {
            return matches!(key.code, KeyCode::Esc | KeyCode::Char('?'))
                .then_some(Command::CloseHelp);
        }

        match key.code {
            KeyCode::Char('q') => Some(Command::Exit),
            KeyCode::Esc => Some(Command::Cancel),
            KeyCode::Char('?') => Some(Command::ToggleHelp),
            KeyCode::Char('m') => Some(Command::ToggleMode),
            KeyCode::Char(c @ '1'..='9') => {
                c.to_digit(10).map(|d| Command::PickColor(d as usize - 1))
            }
            KeyCode::Char('x') | KeyCode::Delete => Some(Command::RemoveAtCursor),
            KeyCode::Char('n') => Some(Command::NextLesson),
            KeyCode::Char('p') => Some(Command::PrevLesson),
            KeyCode::Char('j') | KeyCode::Down => Some(Command::ScrollDown(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Command::ScrollUp(1)),
            KeyCode::PageDown | KeyCode::Char(' ') => Some(Command::PageDown),
            KeyCode::PageUp => Some(Command::PageUp),
            KeyCode::Char('h') | KeyCode::Left => Some(Command::AdjustWidth(-2)),
            KeyCode::Char('l') | KeyCode::Right => Some(Command::AdjustWidth(2)),
            _ => None,
        }
    }
}

impl<S: MarkStore> App<S> {
    pub(super) fn apply_command(&mut self, command: Command, height: u16) -> CommandOutcome {
        match command {
            Command::Exit => return CommandOutcome::Exit,
            Command::Composer(cmd) => self.apply_composer_command(cmd),
            Command::ToggleHelp => self.show_help = !self.show_help,
            Command::CloseHelp => self.show_help = false,
            Command::Cancel => {
                self.view.selection = None;
                self.cursor = None;
                self.notice = None;
            }
            Command::ToggleMode => {
                let next = match self.controller.mode() {
                    Mode::Idle => Mode::Highlight,
                    Mode::Highlight => Mode::Idle,
                };
                let result = self.controller.set_mode(next);
                self.handle(result);
            }
            Command::PickColor(index) => {
                let name = self
                    .controller
                    .settings()
                    .palette
                    .nth(index)
                    .map(|(name, _)| name.to_string());
                match name {
                    Some(name) => match self.controller.set_active_color(&name) {
                        Ok(_) => self.notice = Some(format!("color: {name}")),
                        Err(e) => self.report_error(&e),
                    },
                    None => self.notice = Some(format!("no palette color #{}", index + 1)),
                }
            }
            Command::RemoveAtCursor => self.remove_at_cursor(),
            Command::NextLesson => {
                if self.current + 1 < self.lessons.len() {
                    self.open_lesson(self.current + 1);
                }
            }
            Command::PrevLesson => {
                if self.current > 0 {
                    self.open_lesson(self.current - 1);
                }
            }
            Command::ScrollDown(lines) => self.view.scroll_by(lines as isize),
            Command::ScrollUp(lines) => self.view.scroll_by(-(lines as isize)),
            Command::PageDown => self.view.scroll_by((height / 2) as isize),
            Command::PageUp => self.view.scroll_by(-((height / 2) as isize)),
            Command::AdjustWidth(delta) => self.view.adjust_width(delta),
        }
        CommandOutcome::Continue
    }

    fn apply_composer_command(&mut self, cmd: ComposerCommand) {
        let Some(composer) = self.composer.as_mut() else {
            return;
        };
        match cmd {
            ComposerCommand::SwitchField => composer.switch_field(),
            ComposerCommand::Backspace => composer.backspace(),
            ComposerCommand::Insert(c) => composer.insert(c),
            ComposerCommand::Save => {
                let tags = composer.parsed_tags();
                let comment = composer.comment.trim().to_string();
                let result = self.controller.save_annotation(tags, &comment);
                self.handle(result);
            }
            ComposerCommand::Cancel => {
                let result = self.controller.cancel_annotation();
                self.handle(result);
            }
        }
    }

    fn remove_at_cursor(&mut self) {
        let result = match self.cursor.clone() {
            Some(CursorTarget::Indicator(id)) => self.controller.remove_annotation(&id),
            Some(CursorTarget::Text(offset)) => {
                let layer = self.controller.layer();
                let highlight = layer.highlight_at(offset).map(|w| w.id.clone());
                let annotation = layer
                    .indicator_near(offset, INDICATOR_SLACK)
                    .map(|i| i.annotation_id.clone());
                match (highlight, annotation) {
                    (Some(id), _) => self.controller.remove_highlight(&id),
                    (None, Some(id)) => self.controller.remove_annotation(&id),
                    (None, None) => {
                        self.notice = Some("no mark under the cursor".into());
                        return;
                    }
                }
            }
            None => {
                self.notice = Some("click a highlight or annotation marker first".into());
                return;
            }
        };
        self.cursor = None;
        match result {
            Ok(()) => self.notice = Some("mark removed".into()),
            Err(e) => self.report_error(&e),
        }
        self.view.invalidate();
    }
}
