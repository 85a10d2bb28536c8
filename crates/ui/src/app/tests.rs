use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use lesson_core::config::Settings;
use lesson_core::store::MemoryStore;
use lesson_core::{LessonKey, Mode, RenderedContent, SelectionController};
use ratatui::{backend::TestBackend, prelude::Rect, Terminal};

use super::types::{Command, ComposerCommand, CursorTarget, Lesson};
use super::App;

const FRAME: Rect = Rect {
    x: 0,
    y: 0,
    width: 80,
    height: 20,
};
// First text cell: after the centering pad and the left border, below the
// title row.
const TEXT_X: u16 = 4;
const TEXT_Y: u16 = 1;

fn app_with(lessons: &[(&str, &str)]) -> App<MemoryStore> {
    let lessons: Vec<Lesson> = lessons
        .iter()
        .map(|(id, html)| {
            Lesson::new(
                LessonKey::new("biology", *id),
                RenderedContent::from_html(html),
            )
        })
        .collect();
    let key = lessons[0].key.clone();
    let controller = SelectionController::new(MemoryStore::new(), key, Settings::default());
    App::new(controller, lessons)
}

fn app() -> App<MemoryStore> {
    app_with(&[
        ("osmosis", "<p>Osmosis moves water.</p>"),
        ("mitosis", "<h1>Mitosis</h1><p>Cells divide.</p>"),
    ])
}

fn draw(app: &mut App<MemoryStore>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(FRAME.width, FRAME.height)).unwrap();
    terminal.draw(|f| app.draw(f)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

fn drag(app: &mut App<MemoryStore>, from: u16, to: u16, row: u16) {
    app.handle_mouse(FRAME, mouse(MouseEventKind::Down(MouseButton::Left), from, row));
    app.handle_mouse(FRAME, mouse(MouseEventKind::Drag(MouseButton::Left), to, row));
    app.handle_mouse(FRAME, mouse(MouseEventKind::Up(MouseButton::Left), to, row));
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn keys_map_to_commands() {
    let app = app();
    assert_eq!(Command::from_key(&app, key(KeyCode::Char('q'))), Some(Command::Exit));
    assert_eq!(
        Command::from_key(&app, key(KeyCode::Char('m'))),
        Some(Command::ToggleMode)
    );
    assert_eq!(
        Command::from_key(&app, key(KeyCode::Char('3'))),
        Some(Command::PickColor(2))
    );
    assert_eq!(
        Command::from_key(&app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        Some(Command::Exit)
    );
    assert_eq!(Command::from_key(&app, key(KeyCode::Char('z'))), None);
}

#[test]
fn composer_swallows_typing() {
    let mut app = app();
    drag(&mut app, TEXT_X, TEXT_X + 6, TEXT_Y);
    // Nothing was laid out yet, so the drag missed; draw and retry.
    assert!(app.composer.is_none());
    draw(&mut app);
    drag(&mut app, TEXT_X, TEXT_X + 6, TEXT_Y);
    assert!(app.composer.is_some());
    assert_eq!(
        Command::from_key(&app, key(KeyCode::Char('q'))),
        Some(Command::Composer(ComposerCommand::Insert('q')))
    );
    assert_eq!(
        Command::from_key(&app, key(KeyCode::Esc)),
        Some(Command::Composer(ComposerCommand::Cancel))
    );
}

#[test]
fn draw_shows_text_and_status() {
    let mut app = app();
    let screen = draw(&mut app);
    assert!(screen.contains("Osmosis moves water."));
    assert!(screen.contains("ANNOTATE"));
    assert!(screen.contains("1/2"));
    app.apply_command(Command::ToggleMode, FRAME.height);
    let screen = draw(&mut app);
    assert!(screen.contains("HIGHLIGHT"));
}

#[test]
fn mouse_drag_in_highlight_mode_marks_text() {
    let mut app = app();
    app.apply_command(Command::ToggleMode, FRAME.height);
    assert_eq!(app.controller().mode(), Mode::Highlight);
    draw(&mut app);
    drag(&mut app, TEXT_X, TEXT_X + 6, TEXT_Y);
    let highlights = app.controller().marks().highlights();
    assert_eq!(highlights.len(), 1);
    assert_eq!(highlights[0].text, "Osmosis");
    assert_eq!(app.notice(), Some("highlighted"));
}

#[test]
fn annotation_round_trip_through_the_composer() {
    let mut app = app();
    draw(&mut app);
    drag(&mut app, TEXT_X + 8, TEXT_X + 12, TEXT_Y);
    for c in "exam, bio".chars() {
        app.apply_command(Command::Composer(ComposerCommand::Insert(c)), FRAME.height);
    }
    app.apply_command(Command::Composer(ComposerCommand::SwitchField), FRAME.height);
    for c in "diffusion".chars() {
        app.apply_command(Command::Composer(ComposerCommand::Insert(c)), FRAME.height);
    }
    app.apply_command(Command::Composer(ComposerCommand::Save), FRAME.height);
    assert!(app.composer.is_none());
    let annotations = app.controller().marks().annotations();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].text, "moves");
    assert_eq!(annotations[0].comment, "diffusion");
    assert_eq!(app.controller().layer().indicators().len(), 1);
}

#[test]
fn remove_at_cursor_drops_clicked_highlight() {
    let mut app = app();
    app.apply_command(Command::ToggleMode, FRAME.height);
    draw(&mut app);
    drag(&mut app, TEXT_X, TEXT_X + 6, TEXT_Y);
    draw(&mut app);
    // A plain click only moves the cursor.
    app.handle_mouse(FRAME, mouse(MouseEventKind::Down(MouseButton::Left), TEXT_X + 2, TEXT_Y));
    app.handle_mouse(FRAME, mouse(MouseEventKind::Up(MouseButton::Left), TEXT_X + 2, TEXT_Y));
    assert_eq!(app.cursor, Some(CursorTarget::Text(2)));
    assert_eq!(app.controller().marks().highlights().len(), 1);
    app.apply_command(Command::RemoveAtCursor, FRAME.height);
    assert!(app.controller().marks().highlights().is_empty());
    assert!(app.controller().layer().highlights().is_empty());
}

#[test]
fn remove_at_cursor_drops_annotation_ending_there() {
    let mut app = app();
    draw(&mut app);
    drag(&mut app, TEXT_X + 8, TEXT_X + 12, TEXT_Y);
    for c in "osmosis".chars() {
        app.apply_command(Command::Composer(ComposerCommand::Insert(c)), FRAME.height);
    }
    app.apply_command(Command::Composer(ComposerCommand::Save), FRAME.height);
    draw(&mut app);
    // last letter of "moves"; the marker sits right after it
    app.handle_mouse(FRAME, mouse(MouseEventKind::Down(MouseButton::Left), TEXT_X + 12, TEXT_Y));
    app.handle_mouse(FRAME, mouse(MouseEventKind::Up(MouseButton::Left), TEXT_X + 12, TEXT_Y));
    assert_eq!(app.cursor, Some(CursorTarget::Text(12)));
    app.apply_command(Command::RemoveAtCursor, FRAME.height);
    assert!(app.controller().marks().annotations().is_empty());
    assert!(app.controller().layer().indicators().is_empty());
}

#[test]
fn switching_lessons_remounts() {
    let mut app = app();
    app.apply_command(Command::NextLesson, FRAME.height);
    assert_eq!(app.current_lesson().map(|l| l.title.as_str()), Some("Mitosis"));
    assert_eq!(app.controller().key().lesson_id, "mitosis");
    let screen = draw(&mut app);
    assert!(screen.contains("Cells divide."));
    app.apply_command(Command::NextLesson, FRAME.height);
    assert_eq!(app.current, 1);
    app.apply_command(Command::PrevLesson, FRAME.height);
    assert_eq!(app.controller().key().lesson_id, "osmosis");
}
