use ratatui::style::{Color, Style};

use crate::state::Theme;

/// Colors used by every chat widget for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub user: Color,
    pub summary: Color,
    pub translation: Color,
    pub error: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                background: Color::Rgb(17, 24, 39),
                text: Color::Gray,
                muted: Color::DarkGray,
                accent: Color::Rgb(20, 184, 166),
                user: Color::Cyan,
                summary: Color::Yellow,
                translation: Color::Green,
                error: Color::Red,
                highlight_fg: Color::Black,
                highlight_bg: Color::Rgb(20, 184, 166),
            },
            Theme::Light => Palette {
                background: Color::Rgb(243, 244, 246),
                text: Color::Black,
                muted: Color::Rgb(107, 114, 128),
                accent: Color::Rgb(13, 148, 136),
                user: Color::Blue,
                summary: Color::Rgb(161, 98, 7),
                translation: Color::Rgb(21, 128, 61),
                error: Color::Rgb(185, 28, 28),
                highlight_fg: Color::White,
                highlight_bg: Color::Rgb(13, 148, 136),
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn highlight(&self) -> Style {
        Style::default().fg(self.highlight_fg).bg(self.highlight_bg)
    }
}
