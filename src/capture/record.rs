//! The capture record and the messages built around it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::conditions::CaptureConditions;
use super::intent::{accessible_name, text_preview, ElementIntent};
use super::roles::{nearest_landmark, role_of};
use super::style::{extract_styles, StylePrimitives};
use crate::config::ControllerConfig;
use crate::error::{CaptureError, CaptureResult, OptionExt};
use crate::geometry::{Point, Rect};
use crate::host::{NodeId, PageHost};

// ============================================================================
// Evidence state and capture mode
// ============================================================================

/// Interaction state a capture is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum EvidenceState {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "hover")]
    Hover,
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "as-is")]
    AsIs,
}

impl EvidenceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Hover => "hover",
            Self::Active => "active",
            Self::AsIs => "as-is",
        }
    }
}

/// How the screenshot side should stage the element before shooting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CaptureMode {
    #[default]
    Default,
    ForceHover,
    ForceActive,
    AsIs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CaptureOptions {
    pub mode: CaptureMode,
}

/// A capture request: which state to file under and how to stage it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureRequest {
    pub state: EvidenceState,
    pub mode: CaptureMode,
}

impl CaptureRequest {
    pub fn new(state: EvidenceState, mode: CaptureMode) -> Self {
        Self { state, mode }
    }

    pub fn options(&self) -> CaptureOptions {
        CaptureOptions { mode: self.mode }
    }
}

// ============================================================================
// Record
// ============================================================================

/// DOM identity of the captured element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ElementSnapshot {
    pub tag_name: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub role: Option<String>,
    pub text_preview: Option<String>,
}

impl ElementSnapshot {
    pub fn read(host: &dyn PageHost, node: NodeId, text_max: usize) -> Self {
        Self {
            tag_name: host.tag_name(node),
            id: host.attribute(node, "id").filter(|id| !id.trim().is_empty()),
            classes: class_list(host, node),
            role: role_of(host, node),
            text_preview: text_preview(host, node, text_max),
        }
    }
}

/// Hit-test points used to find the node again out of band.
///
/// They are a resolver hint, never part of the stored record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResolverHints {
    pub hit_points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CaptureRecord {
    pub id: String,
    /// RFC 3339 creation time.
    pub created_at: String,
    pub url: String,
    pub state: EvidenceState,
    pub element: ElementSnapshot,
    pub conditions: CaptureConditions,
    pub intent: ElementIntent,
    pub styles: StylePrimitives,
    pub landmark_role: Option<String>,
    pub bounding_box: Rect,
    #[serde(skip)]
    #[ts(skip)]
    pub hints: ResolverHints,
}

impl CaptureRecord {
    /// Snapshot `node` into a fresh record.
    pub fn assemble(
        host: &dyn PageHost,
        node: NodeId,
        state: EvidenceState,
        config: &ControllerConfig,
    ) -> CaptureResult<Self> {
        if !host.is_connected(node) {
            return Err(CaptureError::InvalidTarget(
                "target is no longer in the document".to_string(),
            ));
        }
        let bounding_box = host
            .bounding_rect(node)
            .or_invalid("target has no layout box")?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            url: host.url(),
            state,
            element: ElementSnapshot::read(host, node, config.intent_text_max),
            conditions: CaptureConditions::snapshot(host),
            intent: ElementIntent::extract(host, node, config.intent_text_max),
            styles: extract_styles(host, node),
            landmark_role: nearest_landmark(host, node),
            bounding_box,
            hints: ResolverHints {
                hit_points: bounding_box.probe_points(config.hit_point_inset).to_vec(),
            },
        })
    }
}

fn class_list(host: &dyn PageHost, node: NodeId) -> Vec<String> {
    host.attribute(node, "class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

// ============================================================================
// Duplicate check
// ============================================================================

/// Identity of a form control beyond its tag and name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormContext {
    pub id: Option<String>,
    pub name: Option<String>,
    pub placeholder: Option<String>,
}

impl FormContext {
    pub fn read(host: &dyn PageHost, node: NodeId) -> Option<Self> {
        if !matches!(host.tag_name(node).as_str(), "INPUT" | "SELECT" | "TEXTAREA") {
            return None;
        }
        let attr = |name: &str| host.attribute(node, name).filter(|v| !v.trim().is_empty());
        Some(Self {
            id: attr("id"),
            name: attr("name"),
            placeholder: attr("placeholder"),
        })
    }
}

/// Key the service uses to decide whether an equivalent capture exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DuplicateCheckRequest {
    pub tag: String,
    pub role: Option<String>,
    pub accessible_name: Option<String>,
    pub text_preview: Option<String>,
    pub requested_state: EvidenceState,
    pub form_context: Option<FormContext>,
}

impl DuplicateCheckRequest {
    pub fn for_target(
        host: &dyn PageHost,
        node: NodeId,
        requested_state: EvidenceState,
        text_max: usize,
    ) -> Self {
        Self {
            tag: host.tag_name(node),
            role: role_of(host, node),
            accessible_name: accessible_name(host, node, text_max),
            text_preview: text_preview(host, node, text_max),
            requested_state,
            form_context: FormContext::read(host, node),
        }
    }
}
