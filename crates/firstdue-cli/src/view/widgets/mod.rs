pub use self::{key_binding_display::*, map_display::*, question_panel::*};

mod key_binding_display;
mod map_display;
mod question_panel;

mod color {
    use ratatui::style::Color;

    pub const RED: Color = Color::Rgb(239, 68, 68);
    pub const BLUE: Color = Color::Rgb(59, 130, 246);
    pub const GREEN: Color = Color::Rgb(34, 197, 94);
    pub const YELLOW: Color = Color::Rgb(234, 179, 8);
    pub const PURPLE: Color = Color::Rgb(168, 85, 247);
    pub const GRAY: Color = Color::Rgb(156, 163, 175);
    pub const SLATE: Color = Color::Rgb(100, 116, 139);
    pub const DARK_SLATE: Color = Color::Rgb(71, 85, 105);
    pub const SKY: Color = Color::Rgb(14, 165, 233);
    pub const CYAN: Color = Color::Rgb(6, 182, 212);
    pub const AMBER: Color = Color::Rgb(245, 158, 11);
    pub const GREY_MAP: Color = Color::Rgb(58, 62, 70);
    pub const DARK_MAP: Color = Color::Rgb(15, 23, 42);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);

    /// Color of a unit's first-due area.
    pub fn unit(unit_id: &str) -> Color {
        match unit_id {
            "E1" => RED,
            "E2" => BLUE,
            "E3" => GREEN,
            "Q5" => YELLOW,
            "E4" => PURPLE,
            _ => GRAY,
        }
    }
}

pub mod style {
    use firstdue_engine::Outcome;
    use ratatui::style::{Modifier, Style};

    use crate::view::widgets::color;

    pub const DEFAULT: Style = Style::new().fg(color::WHITE);
    pub const MUTED: Style = Style::new().fg(color::SLATE);
    pub const HEADING: Style = Style::new().fg(color::SLATE).add_modifier(Modifier::BOLD);
    pub const PROMPT: Style = Style::new().fg(color::WHITE).add_modifier(Modifier::BOLD);
    pub const ACCENT: Style = Style::new().fg(color::AMBER).add_modifier(Modifier::BOLD);
    pub const TITLE: Style = Style::new().fg(color::SKY).add_modifier(Modifier::BOLD);
    pub const ERROR: Style = Style::new().fg(color::RED);

    pub fn outcome(outcome: Outcome) -> Style {
        let fg = match outcome {
            Outcome::Correct | Outcome::Perfect => color::GREEN,
            Outcome::Okay => color::YELLOW,
            Outcome::Wrong | Outcome::Miss => color::RED,
        };
        Style::new().fg(fg).add_modifier(Modifier::BOLD)
    }
}
