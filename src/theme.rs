// Theme module - color scheme and styling
use crossterm::style::Color;

use crate::presenter::Severity;

pub struct SnipTheme;

impl SnipTheme {
    pub fn bg_status() -> Color {
        Color::Rgb { r: 40, g: 40, b: 46 }
    }

    pub fn text_status() -> Color {
        Color::Rgb { r: 200, g: 200, b: 200 }
    }

    pub fn text_primary() -> Color {
        Color::Rgb { r: 248, g: 248, b: 242 }
    }

    pub fn text_secondary() -> Color {
        Color::Rgb { r: 180, g: 180, b: 180 }
    }

    pub fn text_dim() -> Color {
        Color::Rgb { r: 120, g: 120, b: 120 }
    }

    pub fn text_header() -> Color {
        Color::Black
    }

    pub fn accent_header() -> Color {
        Color::Rgb { r: 176, g: 196, b: 222 }  // Light steel blue
    }

    pub fn accent_picker() -> Color {
        Color::Rgb { r: 219, g: 112, b: 147 }  // Soft pink
    }

    pub fn success() -> Color {
        Color::Rgb { r: 152, g: 195, b: 121 }  // Soft green
    }

    pub fn error() -> Color {
        Color::Rgb { r: 224, g: 108, b: 117 }  // Soft red
    }

    pub fn selection() -> Color {
        Color::Rgb { r: 0, g: 255, b: 65 }  // Overlay green
    }

    pub fn severity(severity: Severity) -> Color {
        match severity {
            Severity::Info => Self::text_secondary(),
            Severity::Success => Self::success(),
            Severity::Error => Self::error(),
        }
    }
}
