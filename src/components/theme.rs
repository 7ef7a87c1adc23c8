use serde::{Deserialize, Serialize};
use tui::style::{Color, Modifier, Style};

/// Semantic colours; widgets ask for a role and the theme picks the cell style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeColor {
    Text,
    Primary,
    Secondary,
    Accent,
    Dim,
    Border,
    Selected,
    /// The user's own team.
    Ours,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

pub fn resolve(color: ThemeColor, theme: Theme) -> Style {
    match (color, theme) {
        (ThemeColor::Text, Theme::Dark) => Style::default().fg(Color::Gray),
        (ThemeColor::Text, Theme::Light) => Style::default().fg(Color::Black),
        // FIFA 2026 palette
        (ThemeColor::Primary, Theme::Dark) => Style::default().fg(Color::Rgb(0, 160, 223)),
        (ThemeColor::Primary, Theme::Light) => Style::default().fg(Color::Rgb(0, 84, 166)),
        (ThemeColor::Secondary, Theme::Dark) => Style::default().fg(Color::Rgb(255, 103, 31)),
        (ThemeColor::Secondary, Theme::Light) => Style::default().fg(Color::Rgb(196, 64, 0)),
        (ThemeColor::Accent, Theme::Dark) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        (ThemeColor::Accent, Theme::Light) => Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        (ThemeColor::Dim, Theme::Dark) => Style::default().fg(Color::Indexed(240)),
        (ThemeColor::Dim, Theme::Light) => Style::default().fg(Color::Indexed(246)),
        (ThemeColor::Border, Theme::Dark) => Style::default().fg(Color::White),
        (ThemeColor::Border, Theme::Light) => Style::default().fg(Color::DarkGray),
        (ThemeColor::Selected, Theme::Dark) => Style::default().fg(Color::White).add_modifier(Modifier::BOLD | Modifier::REVERSED),
        (ThemeColor::Selected, Theme::Light) => Style::default().fg(Color::Black).add_modifier(Modifier::BOLD | Modifier::REVERSED),
        (ThemeColor::Ours, Theme::Dark) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        (ThemeColor::Ours, Theme::Light) => Style::default().fg(Color::Rgb(0, 120, 60)).add_modifier(Modifier::BOLD),
        (ThemeColor::Error, _) => Style::default().fg(Color::Red),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_themes() {
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Light.toggle().toggle(), Theme::Light);
    }

    #[test]
    fn themes_differ_for_text() {
        assert_ne!(resolve(ThemeColor::Text, Theme::Dark), resolve(ThemeColor::Text, Theme::Light));
        assert_eq!(resolve(ThemeColor::Error, Theme::Dark), resolve(ThemeColor::Error, Theme::Light));
    }
}
