//! Capture conditions: the viewport and theme at the moment of capture.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::color::parse_color;
use crate::geometry::Size;
use crate::host::PageHost;

/// Color-scheme hint recorded with every capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Theme {
    Dark,
    Light,
    #[default]
    Unknown,
}

/// Read-only snapshot taken once per capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CaptureConditions {
    pub viewport: Size,
    pub device_pixel_ratio: f64,
    /// Best-effort pinch-zoom / visual viewport scale.
    pub zoom: Option<f64>,
    /// Milliseconds since the Unix epoch.
    #[ts(type = "number")]
    pub timestamp_ms: i64,
    pub theme: Theme,
}

impl CaptureConditions {
    pub fn snapshot(host: &dyn PageHost) -> Self {
        let viewport = host.viewport();
        Self {
            viewport: viewport.size,
            device_pixel_ratio: viewport.device_pixel_ratio,
            zoom: viewport.visual_scale,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            theme: detect_theme(host),
        }
    }
}

/// Host hint first; otherwise judge the body (then root) background.
pub fn detect_theme(host: &dyn PageHost) -> Theme {
    match host.theme_hint() {
        Theme::Unknown => {}
        hinted => return hinted,
    }
    [host.body(), host.document_element()]
        .into_iter()
        .flatten()
        .filter_map(|node| host.computed_style(node, "background-color"))
        .filter_map(|raw| parse_color(&raw))
        .find(|rgba| rgba.a > 0.0)
        .map(|rgba| {
            if rgba.luminance() < 0.4 {
                Theme::Dark
            } else {
                Theme::Light
            }
        })
        .unwrap_or(Theme::Unknown)
}
