use std::cmp::min;

use chrono::{DateTime, Local, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::Theme;

/// Colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Palette {
    pub(crate) bg_base: Color,
    pub(crate) bg_panel: Color,
    pub(crate) bg_accent: Color,
    pub(crate) fg_text: Color,
    pub(crate) fg_muted: Color,
    pub(crate) fg_accent: Color,
    pub(crate) success: Color,
    pub(crate) warning: Color,
    pub(crate) error: Color,
}

impl Palette {
    pub(crate) fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg_base: Color::Rgb(14, 17, 23),
                bg_panel: Color::Rgb(22, 26, 34),
                bg_accent: Color::Rgb(32, 37, 47),
                fg_text: Color::Rgb(220, 223, 228),
                fg_muted: Color::DarkGray,
                fg_accent: Color::Rgb(120, 161, 255),
                success: Color::Green,
                warning: Color::Yellow,
                error: Color::Red,
            },
            Theme::Light => Self {
                bg_base: Color::Rgb(248, 249, 251),
                bg_panel: Color::Rgb(255, 255, 255),
                bg_accent: Color::Rgb(226, 232, 245),
                fg_text: Color::Rgb(30, 34, 40),
                fg_muted: Color::Gray,
                fg_accent: Color::Rgb(37, 99, 235),
                success: Color::Rgb(22, 128, 61),
                warning: Color::Rgb(180, 83, 9),
                error: Color::Rgb(185, 28, 28),
            },
        }
    }

    pub(crate) fn accent_title(&self, text: &str) -> Line<'static> {
        Line::from(vec![Span::styled(
            text.to_owned(),
            Style::default()
                .fg(self.fg_accent)
                .add_modifier(Modifier::BOLD),
        )])
    }
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = min(width, area.width);
    let h = min(height, area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

/// First eight chars of a server id.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

pub fn format_datetime(value: &DateTime<Utc>) -> String {
    let local: DateTime<Local> = (*value).into();
    local.format("%Y-%m-%d %H:%M").to_string()
}

pub fn build_help_lines() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Tab / Shift+Tab or ← / →", "Switch status filter"),
        ("j / k or ↓ / ↑", "Move selection"),
        ("a", "Add a task"),
        ("e", "Edit selected task"),
        ("Space / d", "Toggle completed"),
        ("x / Delete", "Delete task (with confirmation)"),
        ("/", "Search"),
        ("c", "Clear search"),
        ("r", "Reload from the service"),
        ("t", "Toggle light/dark theme"),
        ("h", "Toggle this help overlay"),
        ("q", "Quit"),
    ]
}
