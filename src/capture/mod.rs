//! Capture assembly.
//!
//! Extraction (conditions, intent, style primitives, landmark role) and the
//! record built from it, plus the pieces of the capture lifecycle that do
//! not depend on the controller: surface suppression and user-facing text.

pub mod color;
pub mod conditions;
pub mod intent;
pub mod record;
pub mod roles;
pub mod style;

pub use conditions::{CaptureConditions, Theme};
pub use intent::ElementIntent;
pub use record::{
    CaptureMode, CaptureOptions, CaptureRecord, CaptureRequest, DuplicateCheckRequest,
    ElementSnapshot, EvidenceState, FormContext, ResolverHints,
};
pub use style::StylePrimitives;

use crate::error::CaptureError;
use crate::host::{PageHost, SurfaceKind};

/// Surfaces hidden for the duration of a capture.
const SUPPRESSED: [SurfaceKind; 5] = [
    SurfaceKind::Highlight,
    SurfaceKind::Metadata,
    SurfaceKind::StateMenu,
    SurfaceKind::OptionsMenu,
    SurfaceKind::Notice,
];

/// Which suppressed surfaces were visible before the capture hid them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suppression {
    visible: Vec<SurfaceKind>,
}

impl Suppression {
    /// Hide chrome and menus, remembering what was showing.
    pub fn hide_all(host: &mut dyn PageHost) -> Self {
        let visible = SUPPRESSED
            .into_iter()
            .filter(|kind| host.is_surface_visible(*kind))
            .collect();
        for kind in SUPPRESSED {
            host.set_surface_visible(kind, false);
        }
        Self { visible }
    }

    /// Show exactly what was showing before.
    pub fn restore(&self, host: &mut dyn PageHost) {
        for kind in &self.visible {
            if host.is_mounted(*kind) {
                host.set_surface_visible(*kind, true);
            }
        }
    }

    /// Do not bring `kind` back on restore; it was dismissed meanwhile.
    pub fn forget(&mut self, kind: SurfaceKind) {
        self.visible.retain(|k| *k != kind);
    }

    #[cfg(test)]
    pub fn was_visible(&self, kind: SurfaceKind) -> bool {
        self.visible.contains(&kind)
    }
}

/// Confirmation prompt shown when the service reports a duplicate.
pub fn duplicate_message(state: EvidenceState) -> String {
    match state {
        EvidenceState::Default => {
            "This element is already in the inventory. Capture it again?".to_string()
        }
        other => format!(
            "This element was already captured in the \"{}\" state. Capture it again?",
            other.as_str()
        ),
    }
}

/// Notice text for a capture that did not complete.
pub fn failure_notice(error: &CaptureError) -> String {
    match error {
        CaptureError::Timeout { .. } => {
            "Capture is taking longer than expected. It may still be saved.".to_string()
        }
        CaptureError::InvalidTarget(_) => {
            "That element is no longer on the page. Nothing was captured.".to_string()
        }
        other => format!("Capture failed: {}", other),
    }
}
