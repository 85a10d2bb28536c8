use ratatui::prelude::*;

/// Rect of `percent_x` by `percent_y` centered in `area`.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Box of `width` x `height` placed just below `(column, row)`, moved up or
/// left as needed to stay inside `area`.
pub(crate) fn anchored_rect(column: u16, row: u16, width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let max_x = area.x + area.width - width;
    let max_y = area.y + area.height - height;
    let below = row.saturating_add(1);
    let y = if below <= max_y {
        below.max(area.y)
    } else {
        row.saturating_sub(height).clamp(area.y, max_y)
    };
    Rect {
        x: column.clamp(area.x, max_x),
        y,
        width,
        height,
    }
}

pub(crate) fn rect_contains(rect: Rect, col: u16, row: u16) -> bool {
    let x_end = rect.x.saturating_add(rect.width);
    let y_end = rect.y.saturating_add(rect.height);
    col >= rect.x && col < x_end && row >= rect.y && row < y_end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 80, 24);
        let r = anchored_rect(75, 22, 30, 6, area);
        assert!(r.x + r.width <= 80);
        assert!(r.y + r.height <= 24);
        assert!(r.y < 22);

        let r = anchored_rect(10, 3, 30, 6, area);
        assert_eq!((r.x, r.y), (10, 4));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(2, 2, 3, 3);
        assert!(rect_contains(r, 2, 2));
        assert!(!rect_contains(r, 5, 2));
    }
}
