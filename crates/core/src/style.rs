//! Run-level text styling: font name, size, bold flag, color.
//!
//! Every field is optional. Styles are read from the first text run of an
//! existing shape, and a style read that way is merged over caller-supplied
//! defaults with [`TextStyle::or`] so that a property the deck never set
//! does not clobber a known-good fallback.

use serde::{Deserialize, Serialize};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a 6-digit hex string like `"0B1220"` (the `a:srgbClr` form).
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Uppercase 6-digit hex, no leading `#`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Paragraph alignment for inserted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    /// The `a:pPr@algn` attribute value.
    pub fn algn(self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Center => "ctr",
            Align::Right => "r",
        }
    }
}

/// Style of a single text run. Unset fields mean "inherit".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font family name (`a:latin@typeface`).
    pub name: Option<String>,

    /// Font size in points (`a:rPr@sz` is hundredths of a point).
    pub size_pt: Option<f64>,

    /// Bold flag (`a:rPr@b`).
    pub bold: Option<bool>,

    /// Solid fill color of the run.
    pub color: Option<Color>,
}

impl TextStyle {
    pub fn new(
        name: Option<&str>,
        size_pt: Option<f64>,
        bold: Option<bool>,
        color: Option<Color>,
    ) -> Self {
        Self {
            name: name.map(str::to_owned),
            size_pt,
            bold,
            color,
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.size_pt.is_none() && self.bold.is_none() && self.color.is_none()
    }

    /// Fill unset fields from `fallback`, keeping every field this style
    /// already has.
    pub fn or(&self, fallback: &TextStyle) -> TextStyle {
        TextStyle {
            name: self.name.clone().or_else(|| fallback.name.clone()),
            size_pt: self.size_pt.or(fallback.size_pt),
            bold: self.bold.or(fallback.bold),
            color: self.color.or(fallback.color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_round_trip() {
        let c = Color::from_hex("0B1220").unwrap();
        assert_eq!(c, Color::new(0x0B, 0x12, 0x20));
        assert_eq!(c.to_hex(), "0B1220");
        assert_eq!(Color::from_hex("e5e7eb").unwrap().to_hex(), "E5E7EB");
    }

    #[test]
    fn test_color_hex_rejects_malformed() {
        assert_eq!(Color::from_hex("FFF"), None);
        assert_eq!(Color::from_hex("GGGGGG"), None);
        assert_eq!(Color::from_hex("FFFFFF0"), None);
    }

    #[test]
    fn test_style_or_fills_only_gaps() {
        let extracted = TextStyle::new(Some("Pretendard"), None, Some(true), None);
        let defaults = TextStyle::new(Some("Arial"), Some(36.0), Some(false), Some(Color::WHITE));

        let merged = extracted.or(&defaults);
        assert_eq!(merged.name.as_deref(), Some("Pretendard"));
        assert_eq!(merged.size_pt, Some(36.0));
        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.color, Some(Color::WHITE));
    }

    #[test]
    fn test_style_empty() {
        assert!(TextStyle::default().is_empty());
        assert!(!TextStyle::new(None, Some(12.0), None, None).is_empty());
    }
}
