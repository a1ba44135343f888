//! Style primitive extraction.
//!
//! Each facet keeps the raw computed string next to a canonical parsed form,
//! so the downstream service can re-derive anything we parsed wrong.
//! Provenance records whether the authored value went through a CSS
//! variable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::color::ColorValue;
use crate::host::{NodeId, PageHost};

/// A length as computed plus its pixel value when it is a plain `px` length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LengthValue {
    pub raw: String,
    pub px: Option<f64>,
}

impl LengthValue {
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        Self {
            raw: raw.to_string(),
            px: parse_px(raw),
        }
    }
}

/// Per-side values in top/right/bottom/left order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sides<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

/// Per-corner values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Corners<T> {
    pub top_left: T,
    pub top_right: T,
    pub bottom_right: T,
    pub bottom_left: T,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShadowValue {
    pub raw: String,
    pub present: bool,
    /// Best-effort count of comma-separated shadow layers.
    pub layers: u32,
}

impl ShadowValue {
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        let present = !raw.is_empty() && raw != "none";
        Self {
            raw: raw.to_string(),
            present,
            layers: if present {
                split_top_level(raw, ',').len() as u32
            } else {
                0
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Typography {
    pub family: String,
    pub size: LengthValue,
    pub weight: String,
    pub line_height: LengthValue,
}

/// Whether an authored value referenced a CSS variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "lowercase")]
#[ts(export)]
pub enum Provenance {
    /// `var(--name)` appeared in the authored value
    Token { variable: String },
    Literal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StylePrimitives {
    /// Padding.
    pub spacing: Sides<LengthValue>,
    pub margin: Sides<LengthValue>,
    pub border_width: Sides<LengthValue>,
    pub border_color: Sides<ColorValue>,
    pub radius: Corners<LengthValue>,
    pub background_color: ColorValue,
    pub text_color: ColorValue,
    pub shadow: ShadowValue,
    pub typography: Typography,
    pub opacity: Option<f64>,
    pub opacity_raw: String,
    /// Keyed by CSS property name.
    pub provenance: BTreeMap<String, Provenance>,
}

/// Properties whose authored values are checked for variable references.
pub const TRACKED_PROPERTIES: &[&str] = &[
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
    "border-top-left-radius",
    "border-top-right-radius",
    "border-bottom-right-radius",
    "border-bottom-left-radius",
    "background-color",
    "color",
    "box-shadow",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "opacity",
];

/// Read every style primitive of `node`.
pub fn extract_styles(host: &dyn PageHost, node: NodeId) -> StylePrimitives {
    let computed = |prop: &str| host.computed_style(node, prop).unwrap_or_default();
    let length = |prop: &str| LengthValue::from_raw(&computed(prop));
    let color = |prop: &str| ColorValue::from_raw(&computed(prop));
    let sides_of = |prefix: &str, suffix: &str| Sides {
        top: length(&format!("{prefix}-top{suffix}")),
        right: length(&format!("{prefix}-right{suffix}")),
        bottom: length(&format!("{prefix}-bottom{suffix}")),
        left: length(&format!("{prefix}-left{suffix}")),
    };

    let opacity_raw = computed("opacity");
    let provenance = TRACKED_PROPERTIES
        .iter()
        .filter_map(|prop| {
            let authored = host.authored_style(node, prop)?;
            Some((prop.to_string(), provenance_of(&authored)))
        })
        .collect();

    StylePrimitives {
        spacing: sides_of("padding", ""),
        margin: sides_of("margin", ""),
        border_width: sides_of("border", "-width"),
        border_color: Sides {
            top: color("border-top-color"),
            right: color("border-right-color"),
            bottom: color("border-bottom-color"),
            left: color("border-left-color"),
        },
        radius: Corners {
            top_left: length("border-top-left-radius"),
            top_right: length("border-top-right-radius"),
            bottom_right: length("border-bottom-right-radius"),
            bottom_left: length("border-bottom-left-radius"),
        },
        background_color: color("background-color"),
        text_color: color("color"),
        shadow: ShadowValue::from_raw(&computed("box-shadow")),
        typography: Typography {
            family: computed("font-family").trim().to_string(),
            size: length("font-size"),
            weight: computed("font-weight").trim().to_string(),
            line_height: length("line-height"),
        },
        opacity: opacity_raw.trim().parse::<f64>().ok(),
        opacity_raw: opacity_raw.trim().to_string(),
        provenance,
    }
}

/// Classify an authored value as token-backed or literal.
pub fn provenance_of(authored: &str) -> Provenance {
    match variable_name(authored) {
        Some(variable) => Provenance::Token { variable },
        None => Provenance::Literal,
    }
}

/// Name of the first custom property referenced through `var(...)`.
pub fn variable_name(value: &str) -> Option<String> {
    let start = value.find("var(")? + "var(".len();
    let rest = value[start..].trim_start();
    let name: String = rest
        .chars()
        .take_while(|c| !matches!(c, ',' | ')') && !c.is_whitespace())
        .collect();
    name.starts_with("--").then_some(name)
}

/// `"12px"` → `12.0`. Other units are left unparsed.
pub fn parse_px(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw == "0" {
        return Some(0.0);
    }
    raw.strip_suffix("px")?.trim().parse::<f64>().ok()
}

/// Split on `sep` outside parentheses.
fn split_top_level(value: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, ch) in value.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(value[start..idx].trim());
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(value[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}
