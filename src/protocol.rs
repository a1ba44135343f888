//! Message protocol between the page controller, the extension shell and
//! the persistence service.
//!
//! Every message is a JSON object tagged by a kebab-case `type`; payload
//! fields are camelCase.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::capture::record::{CaptureOptions, CaptureRecord, DuplicateCheckRequest, ResolverHints};
use crate::region::RegionCaptureRequest;

// ============================================================================
// Controller -> service
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[ts(export)]
pub enum ServiceMessage {
    DuplicateCheck(DuplicateCheckRequest),
    #[serde(rename_all = "camelCase")]
    Capture {
        record: CaptureRecord,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        capture_options: Option<CaptureOptions>,
        /// Resolver hint riding next to the record
        hints: ResolverHints,
    },
    RegionCapture(RegionCaptureRequest),
}

impl ServiceMessage {
    pub fn capture(record: CaptureRecord, capture_options: Option<CaptureOptions>) -> Self {
        Self::Capture {
            hints: record.hints.clone(),
            record,
            capture_options,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateCheck(_) => "duplicate-check",
            Self::Capture { .. } => "capture",
            Self::RegionCapture(_) => "region-capture",
        }
    }
}

/// `{ ok }` acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub const OK: Ack = Ack { ok: true };
    pub const FAILED: Ack = Ack { ok: false };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DuplicateCheckReply {
    pub ok: bool,
    #[serde(default)]
    pub is_duplicate: bool,
}

// ============================================================================
// Extension shell -> controller
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[ts(export)]
pub enum ControlMessage {
    /// `enabled` absent flips the current mode
    ToggleCaptureMode {
        #[serde(default)]
        enabled: Option<bool>,
    },
    GetCaptureModeState,
    #[serde(rename_all = "camelCase")]
    MarkLastTarget { marker_id: String },
    #[serde(rename_all = "camelCase")]
    UnmarkLastTarget { marker_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CaptureModeState {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum ControlReply {
    Ack(Ack),
    State(CaptureModeState),
}
