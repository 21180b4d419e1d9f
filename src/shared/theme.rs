use ratatui::style::{Color, Modifier, Style};

use super::config::ThemeMode;
use crate::billing::Urgency;
use crate::cafe::MachineStatus;

/// Color palette for the console
#[derive(Debug, Clone)]
pub struct ModernTheme {
    pub accent: Color,

    // Status colors
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub info: Color,

    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_disabled: Color,

    pub selected: Color,
    pub border: Color,
    pub border_focused: Color,
}

impl Default for ModernTheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl ModernTheme {
    pub fn from_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
            ThemeMode::Ocean => Self::ocean(),
        }
    }

    /// Dark theme with emerald accents
    pub fn dark() -> Self {
        Self {
            accent: Color::Rgb(250, 204, 21),    // Yellow-400

            success: Color::Rgb(34, 197, 94),  // Green-500
            warning: Color::Rgb(251, 191, 36), // Amber-400
            danger: Color::Rgb(239, 68, 68),   // Red-500
            info: Color::Rgb(59, 130, 246),    // Blue-500

            text_primary: Color::Rgb(243, 244, 246),   // Gray-100
            text_secondary: Color::Rgb(156, 163, 175), // Gray-400
            text_disabled: Color::Rgb(107, 114, 128),  // Gray-500

            selected: Color::Rgb(5, 150, 105),        // Emerald-600
            border: Color::Rgb(75, 85, 99),           // Gray-600
            border_focused: Color::Rgb(16, 185, 129), // Emerald-500
        }
    }

    /// Light theme for bright front-desk screens
    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(180, 83, 9),

            success: Color::Rgb(22, 163, 74),
            warning: Color::Rgb(217, 119, 6),
            danger: Color::Rgb(220, 38, 38),
            info: Color::Rgb(37, 99, 235),

            text_primary: Color::Rgb(17, 24, 39),
            text_secondary: Color::Rgb(75, 85, 99),
            text_disabled: Color::Rgb(156, 163, 175),

            selected: Color::Rgb(4, 120, 87),
            border: Color::Rgb(209, 213, 219),
            border_focused: Color::Rgb(4, 120, 87),
        }
    }

    /// Cool blue theme
    pub fn ocean() -> Self {
        Self {
            accent: Color::Rgb(20, 184, 166),   // Teal-500

            success: Color::Rgb(16, 185, 129), // Emerald-500
            warning: Color::Rgb(245, 158, 11), // Amber-500
            danger: Color::Rgb(244, 63, 94),   // Rose-500
            info: Color::Rgb(99, 102, 241),    // Indigo-500

            text_primary: Color::Rgb(248, 250, 252),   // Slate-50
            text_secondary: Color::Rgb(148, 163, 184), // Slate-400
            text_disabled: Color::Rgb(100, 116, 139),  // Slate-500

            selected: Color::Rgb(2, 132, 199),        // Sky-600
            border: Color::Rgb(71, 85, 105),          // Slate-600
            border_focused: Color::Rgb(14, 165, 233), // Sky-500
        }
    }
}

/// Unicode symbols used across the console
pub struct ModernIcons;

impl ModernIcons {
    pub const ACTIVE: &'static str = "●";
    pub const INACTIVE: &'static str = "○";

    // Tabs
    pub const DASHBOARD: &'static str = "◉";
    pub const SESSIONS: &'static str = "⚡";
    pub const PROFILE: &'static str = "◆";
    pub const MACHINES: &'static str = "▣";

    // Urgency
    pub const NORMAL: &'static str = "✓";
    pub const WARNING: &'static str = "▲";
    pub const CRITICAL: &'static str = "◆";
    pub const EXPIRED: &'static str = "✗";

    pub const MONEY: &'static str = "$";
    pub const REFRESH: &'static str = "⟳";
    pub const TIME: &'static str = "◷";
    pub const ARROW_RIGHT: &'static str = "▶";
    pub const BULLET: &'static str = "•";
    pub const HELP: &'static str = "❓";
}

/// Progress bar characters
pub struct ProgressChars;

impl ProgressChars {
    pub const FILLED: char = '█';
    pub const EMPTY: char = '░';
    pub const PARTIAL: char = '▒';
}

impl ModernTheme {
    /// Style for headers and titles
    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn secondary_text_style(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    pub fn success_style(&self) -> Style {
        Style::default()
            .fg(self.success)
            .add_modifier(Modifier::BOLD)
    }

    pub fn warning_style(&self) -> Style {
        Style::default()
            .fg(self.warning)
            .add_modifier(Modifier::BOLD)
    }

    pub fn danger_style(&self) -> Style {
        Style::default()
            .fg(self.danger)
            .add_modifier(Modifier::BOLD)
    }

    pub fn info_style(&self) -> Style {
        Style::default().fg(self.info)
    }

    /// Style for the highlighted row
    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.text_primary)
            .bg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focused_style(&self) -> Style {
        Style::default()
            .fg(self.border_focused)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for numbers and metrics
    pub fn metric_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dimmed_style(&self) -> Style {
        Style::default().fg(self.text_disabled)
    }

    /// Colour of a remaining-time indicator
    pub fn urgency_style(&self, urgency: Urgency) -> Style {
        match urgency {
            Urgency::Normal => self.success_style(),
            Urgency::Warning => self.warning_style(),
            Urgency::Critical => self.danger_style(),
            Urgency::Expired => self.danger_style().add_modifier(Modifier::DIM),
        }
    }

    pub fn machine_status_style(&self, status: &MachineStatus) -> Style {
        match status {
            MachineStatus::Available => self.success_style(),
            MachineStatus::InUse => self.warning_style(),
            MachineStatus::Maintenance => self.danger_style(),
            MachineStatus::Other(_) => self.secondary_text_style(),
        }
    }

    /// Credits green, debits red
    pub fn amount_style(&self, amount: f64) -> Style {
        if amount > 0.0 {
            self.success_style()
        } else {
            self.danger_style()
        }
    }

    /// Style for a share of something filling up (machine utilization)
    pub fn progress_style_for_percentage(&self, percentage: f64) -> Style {
        if percentage >= 90.0 {
            self.danger_style()
        } else if percentage >= 70.0 {
            self.warning_style()
        } else {
            self.success_style()
        }
    }
}
