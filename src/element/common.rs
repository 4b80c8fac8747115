use egui::Color32;
use serde::{Deserialize, Serialize};

// Minimum element size enforced by resize and by direct size edits
pub const MIN_ELEMENT_WIDTH: f32 = 50.0;
pub const MIN_ELEMENT_HEIGHT: f32 = 30.0;

pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_FONT_SIZE: f32 = 14.0;
pub const DEFAULT_LINE_HEIGHT: f32 = 1.4;
pub const DEFAULT_FONT_FAMILY: &str = "Arial, sans-serif";

/// Style attributes shared by every variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub background_color: Option<String>,
    /// Raw CSS-like border spec, e.g. `1px solid #ccc`
    pub border: Option<String>,
    pub border_radius: f32,
    pub padding: f32,
    /// 0..=1
    pub opacity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background_color: None,
            border: None,
            border_radius: 0.0,
            padding: 0.0,
            opacity: 1.0,
        }
    }
}

/// A parsed border spec
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderStyle {
    pub width: f32,
    pub color: Color32,
}

/// Parse a CSS hex color (`#rgb`, `#rrggbb`, `#rrggbbaa`) or one of a few names
pub fn parse_color(value: &str) -> Option<Color32> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return match hex.len() {
            3 => Some(Color32::from_rgb(
                digit(0)? * 17,
                digit(1)? * 17,
                digit(2)? * 17,
            )),
            6 => Some(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color32::from_rgba_unmultiplied(
                byte(0)?,
                byte(2)?,
                byte(4)?,
                byte(6)?,
            )),
            _ => None,
        };
    }

    match value.to_ascii_lowercase().as_str() {
        "black" => Some(Color32::BLACK),
        "white" => Some(Color32::WHITE),
        "red" => Some(Color32::from_rgb(255, 0, 0)),
        "green" => Some(Color32::from_rgb(0, 128, 0)),
        "blue" => Some(Color32::from_rgb(0, 0, 255)),
        "gray" | "grey" => Some(Color32::from_rgb(128, 128, 128)),
        "transparent" => Some(Color32::TRANSPARENT),
        _ => None,
    }
}

/// Parse a color, falling back when it is missing or malformed
pub fn color_or(value: Option<&str>, fallback: Color32) -> Color32 {
    match value {
        Some(value) => parse_color(value).unwrap_or_else(|| {
            log::debug!("Unparseable color {:?}, using fallback", value);
            fallback
        }),
        None => fallback,
    }
}

/// Parse a border spec such as `1px solid #ccc`.
///
/// Width defaults to 1px and color to black when only some parts are given.
/// `none` and zero-width borders yield `None`.
pub fn parse_border(spec: &str) -> Option<BorderStyle> {
    let spec = spec.trim();
    if spec.is_empty() || spec.eq_ignore_ascii_case("none") {
        return None;
    }

    let mut width = 1.0;
    let mut color = Color32::BLACK;
    for token in spec.split_whitespace() {
        if let Some(px) = token.strip_suffix("px") {
            if let Ok(value) = px.parse::<f32>() {
                width = value;
            }
        } else if let Some(parsed) = parse_color(token) {
            color = parsed;
        }
    }

    if width <= 0.0 {
        None
    } else {
        Some(BorderStyle { width, color })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(parse_color("#ccc"), Some(Color32::from_rgb(204, 204, 204)));
        assert_eq!(parse_color("#3b82f6"), Some(Color32::from_rgb(59, 130, 246)));
        assert_eq!(parse_color(" #FFFFFF "), Some(Color32::WHITE));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzz"), None);
        assert_eq!(parse_color("chartreuse"), None);
    }

    #[test]
    fn test_parse_border() {
        let border = parse_border("1px solid #ccc").unwrap();
        assert_eq!(border.width, 1.0);
        assert_eq!(border.color, Color32::from_rgb(204, 204, 204));

        let border = parse_border("2.5px dashed").unwrap();
        assert_eq!(border.width, 2.5);
        assert_eq!(border.color, Color32::BLACK);

        assert!(parse_border("none").is_none());
        assert!(parse_border("0px solid #000").is_none());
        assert!(parse_border("").is_none());
    }
}
