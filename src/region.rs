//! Region selection tool.
//!
//! `Inactive → Armed → Dragging → (Armed | Inactive)`. A release that
//! produces a box below the minimum size re-arms the tool instead of
//! capturing.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::geometry::{Point, Rect, Size};

/// How a region capture was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RegionKind {
    /// The user dragged a rectangle
    Region,
    /// Full-viewport shortcut
    Viewport,
}

/// Payload of `region-capture`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegionCaptureRequest {
    pub bounding_box: Rect,
    pub device_pixel_ratio: f64,
    pub url: String,
    pub viewport: Size,
    pub kind: RegionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RegionPhase {
    #[default]
    Inactive,
    Armed,
    Dragging { start: Point, current: Point },
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionRelease {
    /// Not dragging; nothing happened
    Ignored,
    /// Too small; the tool is armed again
    TooSmall,
    /// A valid selection; the tool is torn down
    Selected(Rect),
}

#[derive(Debug, Default)]
pub struct RegionTool {
    phase: RegionPhase,
}

impl RegionTool {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn phase(&self) -> RegionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, RegionPhase::Inactive)
    }

    pub fn arm(&mut self) {
        self.phase = RegionPhase::Armed;
    }

    /// Start a drag. Only valid while armed.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        if self.phase != RegionPhase::Armed {
            return false;
        }
        self.phase = RegionPhase::Dragging {
            start: point,
            current: point,
        };
        true
    }

    /// Rectangle to draw, clamped to the viewport.
    pub fn pointer_move(&mut self, point: Point, viewport: Size) -> Option<Rect> {
        match &mut self.phase {
            RegionPhase::Dragging { start, current } => {
                *current = point;
                Some(Rect::from_points(*start, point).clamp_to(viewport))
            }
            _ => None,
        }
    }

    pub fn pointer_up(&mut self, point: Point, viewport: Size, min_size: f64) -> RegionRelease {
        let RegionPhase::Dragging { start, .. } = self.phase else {
            return RegionRelease::Ignored;
        };
        let rect = Rect::from_points(start, point).clamp_to(viewport);
        if rect.width < min_size || rect.height < min_size {
            log::debug!(
                "[REGION] Selection {:.0}x{:.0} below minimum, re-arming",
                rect.width,
                rect.height
            );
            self.phase = RegionPhase::Armed;
            return RegionRelease::TooSmall;
        }
        self.phase = RegionPhase::Inactive;
        RegionRelease::Selected(rect)
    }

    /// Tear down unconditionally. Returns true if the tool was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        self.phase = RegionPhase::Inactive;
        was_active
    }
}
