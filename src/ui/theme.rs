//! Theme and styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for a theme.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Brand Colors
    pub primary: Color,
    pub accent: Color,

    // Semantic Colors
    pub success: Color,

    // Background Colors
    pub bg: Color,
    pub bg_highlight: Color,

    // Text Colors
    pub text: Color,
    pub text_muted: Color,
    pub text_dim: Color,

    // Grade Colors
    pub grade_mastered: Color,
    pub grade_partial: Color,
    pub grade_missed: Color,
}

/// Available theme names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Slate,
    Paper,
}

impl ThemeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Slate => "slate",
            ThemeName::Paper => "paper",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeName::Slate => "Slate",
            ThemeName::Paper => "Paper",
        }
    }

    /// Unknown names fall back to the dark theme.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "paper" | "light" => ThemeName::Paper,
            _ => ThemeName::Slate,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ThemeName::Slate => ThemeName::Paper,
            ThemeName::Paper => ThemeName::Slate,
        }
    }
}

/// Theme struct that holds colors and provides style methods.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub colors: ThemeColors,
}

impl Theme {
    pub fn new(name: ThemeName) -> Self {
        let colors = match name {
            ThemeName::Slate => Self::slate_colors(),
            ThemeName::Paper => Self::paper_colors(),
        };
        Self { name, colors }
    }

    pub fn from_name(name: &str) -> Self {
        Self::new(ThemeName::parse(name))
    }

    fn slate_colors() -> ThemeColors {
        ThemeColors {
            primary: Color::Rgb(96, 165, 250),       // Blue 400
            accent: Color::Rgb(244, 114, 182),       // Pink 400

            success: Color::Rgb(74, 222, 128),       // Green 400

            bg: Color::Rgb(17, 24, 39),              // Gray 900
            bg_highlight: Color::Rgb(55, 65, 81),    // Gray 700

            text: Color::Rgb(243, 244, 246),         // Gray 100
            text_muted: Color::Rgb(156, 163, 175),   // Gray 400
            text_dim: Color::Rgb(107, 114, 128),     // Gray 500

            grade_mastered: Color::Rgb(22, 163, 74), // Green 600
            grade_partial: Color::Rgb(234, 179, 8),  // Yellow 500
            grade_missed: Color::Rgb(220, 38, 38),   // Red 600
        }
    }

    /// Light theme for bright terminals.
    fn paper_colors() -> ThemeColors {
        ThemeColors {
            primary: Color::Rgb(37, 99, 235),        // Blue 600
            accent: Color::Rgb(190, 24, 93),         // Pink 700

            success: Color::Rgb(21, 128, 61),        // Green 700

            bg: Color::Rgb(243, 244, 246),           // Gray 100
            bg_highlight: Color::Rgb(209, 213, 219), // Gray 300

            text: Color::Rgb(17, 24, 39),            // Gray 900
            text_muted: Color::Rgb(75, 85, 99),      // Gray 600
            text_dim: Color::Rgb(156, 163, 175),     // Gray 400

            grade_mastered: Color::Rgb(22, 163, 74),
            grade_partial: Color::Rgb(202, 138, 4),
            grade_missed: Color::Rgb(185, 28, 28),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Styles
    // ══════════════════════════════════════════════════════════════════════

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.colors.text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.colors.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.colors.bg_highlight)
            .fg(self.colors.text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.colors.text_muted)
    }

    pub fn card_front(&self) -> Style {
        Style::default()
            .fg(self.colors.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn card_back(&self) -> Style {
        Style::default()
            .fg(self.colors.success)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.colors.text_dim)
    }

    pub fn key_highlight(&self) -> Style {
        Style::default()
            .fg(self.colors.accent)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeName::Slate)
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Icons
// ══════════════════════════════════════════════════════════════════════════

pub mod icons {
    use crate::models::Grade;

    pub const CHECK: &str = "✓";
    pub const HALF: &str = "◐";
    pub const CROSS: &str = "✗";

    pub fn for_grade(grade: Grade) -> &'static str {
        match grade {
            Grade::Mastered => CHECK,
            Grade::Partial => HALF,
            Grade::Missed => CROSS,
        }
    }
}
