use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use lesson_core::controller::ScreenAnchor;
use lesson_core::store::MarkStore;
use ratatui::prelude::Rect;

use crate::lesson_view::Hit;

use super::types::{CursorTarget, Drag};
use super::App;

impl<S: MarkStore> App<S> {
    /// Press starts a drag on text or opens a clicked indicator; release after
    /// a drag hands the selected stream range to the controller.
    pub(super) fn handle_mouse(&mut self, frame: Rect, mouse: MouseEvent) {
        let hit = self.view.hit(frame, mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => match hit {
                Some(Hit::Text { start, end }) => {
                    self.drag = Some(Drag::new(start, end));
                    self.view.selection = None;
                }
                Some(Hit::Indicator(id)) => {
                    self.drag = None;
                    self.cursor = Some(CursorTarget::Indicator(id.clone()));
                    let result = self.controller.on_indicator_click(&id);
                    self.handle(result);
                    if let Some(composer) = self.composer.as_mut() {
                        composer.place(mouse.column, mouse.row);
                    }
                }
                None => {
                    self.drag = None;
                    self.view.selection = None;
                }
            },
            MouseEventKind::Drag(MouseButton::Left) => {
                if let (Some(drag), Some(Hit::Text { start, end })) = (self.drag.as_mut(), hit) {
                    drag.head = (start, end);
                    drag.moved = true;
                    self.view.selection = Some(drag.range());
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(drag) = self.drag.take() else {
                    return;
                };
                self.view.selection = None;
                if drag.moved {
                    let anchor = ScreenAnchor {
                        column: mouse.column,
                        row: mouse.row,
                    };
                    let result = self.controller.select_range(drag.range(), anchor);
                    self.handle(result);
                } else {
                    self.cursor = Some(CursorTarget::Text(drag.anchor.0));
                }
            }
            MouseEventKind::ScrollDown => self.view.scroll_by(3),
            MouseEventKind::ScrollUp => self.view.scroll_by(-3),
            _ => {}
        }
    }
}
