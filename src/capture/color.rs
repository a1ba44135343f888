//! CSS color parsing into raw + RGBA + hex forms.
//!
//! Computed styles almost always serialize as `rgb()`/`rgba()`, but authored
//! fallbacks can be hex or `transparent`, so those are understood too.
//! Anything else (`color-mix()`, `oklch()`, system colors) keeps only its raw
//! string.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 8-bit RGB channels plus a 0.0-1.0 alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    /// `#rrggbbaa`, lower-case.
    pub fn to_hex8(&self) -> String {
        let alpha = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, alpha)
    }

    /// Relative luminance (sRGB, 0.0 = black, 1.0 = white).
    pub fn luminance(&self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }
}

/// A color as computed, parsed when possible.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ColorValue {
    pub raw: String,
    pub rgba: Option<Rgba>,
    pub hex8: Option<String>,
}

impl ColorValue {
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        let rgba = parse_color(raw);
        Self {
            raw: raw.to_string(),
            hex8: rgba.map(|c| c.to_hex8()),
            rgba,
        }
    }
}

/// Parse `rgb()`, `rgba()`, `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` and
/// `transparent`.
pub fn parse_color(raw: &str) -> Option<Rgba> {
    let value = raw.trim().to_ascii_lowercase();
    if value == "transparent" {
        return Some(Rgba::TRANSPARENT);
    }
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    let inner = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    parse_rgb_args(inner)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expand = |s: &str| -> Option<u8> {
        let v = u8::from_str_radix(s, 16).ok()?;
        Some(if s.len() == 1 { v * 17 } else { v })
    };
    let (r, g, b, a) = match hex.len() {
        3 | 4 => (
            expand(&hex[0..1])?,
            expand(&hex[1..2])?,
            expand(&hex[2..3])?,
            if hex.len() == 4 { expand(&hex[3..4])? } else { 255 },
        ),
        6 | 8 => (
            expand(&hex[0..2])?,
            expand(&hex[2..4])?,
            expand(&hex[4..6])?,
            if hex.len() == 8 { expand(&hex[6..8])? } else { 255 },
        ),
        _ => return None,
    };
    Some(Rgba {
        r,
        g,
        b,
        a: a as f64 / 255.0,
    })
}

/// Accepts both `r, g, b[, a]` and `r g b[ / a]` syntaxes.
fn parse_rgb_args(inner: &str) -> Option<Rgba> {
    let normalized = inner.replace('/', " ").replace(',', " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v = match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? * 2.55,
            None => s.parse::<f64>().ok()?,
        };
        Some(v.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(s) => match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? / 100.0,
            None => s.parse::<f64>().ok()?,
        },
        None => 1.0,
    };
    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a: alpha.clamp(0.0, 1.0),
    })
}
