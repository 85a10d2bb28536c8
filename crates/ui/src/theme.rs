use lesson_core::RgbColor;
use ratatui::prelude::{Color, Modifier, Style};

// Tokyonight-inspired palette; tweak these to change the chrome colors.
const TN_BG_ALT: Color = Color::Rgb(31, 35, 53); // #1f2335
const TN_BG_STRONG: Color = Color::Rgb(65, 72, 104); // #414868
const TN_FG: Color = Color::Rgb(192, 202, 245); // #c0caf5
const TN_BLUE: Color = Color::Rgb(122, 162, 247); // #7aa2f7
const TN_ORANGE: Color = Color::Rgb(255, 158, 100); // #ff9e64
const TN_GREEN: Color = Color::Rgb(158, 206, 106); // #9ece6a
const TN_COMMENT: Color = Color::Rgb(86, 95, 137); // #565f89

#[derive(Clone, Debug)]
pub struct Theme {
    pub status_bg: Color,
    pub status_fg: Color,
    pub status_pad_bg: Color,
    pub mode_highlight: Color,
    pub mode_annotate: Color,
    pub selection_bg: Color,
    pub indicator_fg: Color,
    pub heading_fg: Color,
    pub code_fg: Color,
    pub quote_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            status_bg: TN_BG_STRONG,
            status_fg: TN_FG,
            status_pad_bg: TN_BG_ALT,
            mode_highlight: TN_ORANGE,
            mode_annotate: TN_BLUE,
            selection_bg: TN_BG_STRONG,
            indicator_fg: TN_ORANGE,
            heading_fg: TN_BLUE,
            code_fg: TN_GREEN,
            quote_fg: TN_COMMENT,
        }
    }
}

impl Theme {
    pub fn indicator_style(&self) -> Style {
        Style::default()
            .fg(self.indicator_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selection_style(&self) -> Style {
        Style::default().bg(self.selection_bg).fg(TN_FG)
    }
}

pub(crate) fn rgb(color: RgbColor) -> Color {
    Color::Rgb(color.r(), color.g(), color.b())
}
