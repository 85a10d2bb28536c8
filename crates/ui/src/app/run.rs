use std::{io::stdout, time::Duration};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lesson_core::controller::Mode;
use lesson_core::store::MarkStore;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::layout::centered_rect;

use super::types::{Command, CommandOutcome};
use super::App;

const HELP_LINES: &[&str] = &[
    "q / Ctrl-C: quit",
    "m: toggle highlight mode (off = annotate mode)",
    "drag with the mouse: select text",
    "  highlight mode: mark, toggle off or extend a highlight",
    "  annotate mode: open the annotation popover",
    "1-9: pick highlight color",
    "click a marker: edit its annotation",
    "x / Delete: remove the clicked highlight or annotation",
    "n / p: next / previous lesson",
    "j / k or arrows: scroll lines; PageUp / PageDown / Space: half page",
    "h / l: adjust column width",
    "?: toggle this help",
];

impl<S: MarkStore> App<S> {
    pub fn run(mut self) -> std::io::Result<()> {
        let mut stdout = stdout();
        let raw_ok = enable_raw_mode().is_ok();
        if raw_ok {
            execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        } else {
            execute!(stdout, EnterAlternateScreen)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        let mut last_frame = Rect::default();

        if !raw_ok {
            // Non-interactive fallback: draw once and exit cleanly
            terminal.draw(|f| self.draw(f))?;
            execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
            return Ok(());
        }

        loop {
            terminal.draw(|f| {
                last_frame = f.area();
                self.draw(f);
            })?;

            match event::poll(Duration::from_millis(100)) {
                Ok(true) => match event::read() {
                    Ok(Event::Mouse(mouse)) => {
                        if self.composer.is_none() && !self.show_help {
                            self.handle_mouse(last_frame, mouse);
                        }
                    }
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if let Some(command) = Command::from_key(&self, key) {
                            if self.apply_command(command, last_frame.height)
                                == CommandOutcome::Exit
                            {
                                break;
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(_) => break,
                },
                Ok(false) => {}
                Err(_) => break,
            }
        }

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        Ok(())
    }

    pub(super) fn draw(&mut self, f: &mut Frame<'_>) {
        let size = f.area();
        let area = self.view.content_area(size);
        if let Some(lesson) = self.lessons.get(self.current) {
            self.view.reflow(
                &lesson.content,
                self.controller.model(),
                self.controller.layer(),
                &self.controller.settings().indicator,
                area.width as usize,
            );
        }
        self.view.render(f, size, self.controller.layer(), &self.theme);
        self.render_status(f, size);
        if let Some(composer) = &self.composer {
            composer.render(f, size, &self.theme);
        }
        if self.show_help {
            let popup_area = centered_rect(70, 70, size);
            let colors: Vec<String> = self
                .controller
                .settings()
                .palette
                .iter()
                .take(9)
                .enumerate()
                .map(|(i, (name, _))| format!("{} {}", i + 1, name))
                .collect();
            let text = format!("{}\n\ncolors: {}", HELP_LINES.join("\n"), colors.join("  "));
            let help = Paragraph::new(text)
                .block(
                    Block::default()
                        .title("Help (Esc or ? to close)")
                        .borders(Borders::ALL),
                )
                .wrap(Wrap { trim: false });
            f.render_widget(Clear, popup_area);
            f.render_widget(help, popup_area);
        }
    }

    fn render_status(&self, f: &mut Frame<'_>, size: Rect) {
        if size.height == 0 {
            return;
        }
        let bar = Rect {
            y: size.y + size.height - 1,
            height: 1,
            ..size
        };
        let (label, mode_color) = match self.controller.mode() {
            Mode::Highlight => (" HIGHLIGHT ", self.theme.mode_highlight),
            Mode::Idle => (" ANNOTATE ", self.theme.mode_annotate),
        };
        let active = self.controller.active_color();
        let color_name = self
            .controller
            .settings()
            .palette
            .name_of(active)
            .map(str::to_string)
            .unwrap_or_else(|| active.to_hex());
        let lesson = format!(
            " {}/{} ",
            (self.current + 1).min(self.lessons.len()),
            self.lessons.len()
        );
        let base = Style::default()
            .bg(self.theme.status_bg)
            .fg(self.theme.status_fg);
        let mut spans = vec![
            Span::styled(
                label,
                Style::default()
                    .bg(mode_color)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ", base),
            Span::styled("■", base.fg(crate::theme::rgb(active))),
            Span::styled(format!(" {color_name} "), base),
            Span::styled(lesson, base),
        ];
        if let Some(notice) = &self.notice {
            spans.push(Span::styled(format!(" {notice}"), base));
        }
        let status = Paragraph::new(Line::from(spans))
            .style(Style::default().bg(self.theme.status_pad_bg));
        f.render_widget(status, bar);
    }
}
