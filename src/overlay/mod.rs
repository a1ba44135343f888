//! Hover highlight and metadata readout.
//!
//! Pointer moves only record the position and make sure one animation frame
//! is pending; the hit-test runs once when that frame fires. While a capture
//! is in flight the frame callback and every show call are gated off so the
//! chrome never lands in a screenshot.

pub mod readout;

use crate::config::ControllerConfig;
use crate::geometry::Point;
use crate::host::{FrameHandle, NodeId, PageHost, SurfaceContent, SurfaceKind};
use crate::target::{resolve_at, TargetCell};

pub use readout::{describe_node, readout_position, readout_text, CAPTURING_TEXT};

fn chrome() -> impl Iterator<Item = SurfaceKind> {
    SurfaceKind::ALL.into_iter().filter(SurfaceKind::is_chrome)
}

#[derive(Debug, Default)]
pub struct Overlay {
    pending_frame: Option<FrameHandle>,
    last_pointer: Option<Point>,
    capture_in_progress: bool,
    /// Replaces the readout text while set.
    status: Option<String>,
    /// Target (and frozen flag) the readout was last laid out for.
    readout_for: Option<(NodeId, bool)>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_pointer(&self) -> Option<Point> {
        self.last_pointer
    }

    pub fn record_pointer(&mut self, point: Point) {
        self.last_pointer = Some(point);
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn is_capture_in_progress(&self) -> bool {
        self.capture_in_progress
    }

    /// Make sure exactly one frame is pending. Returns true if one was requested.
    pub fn schedule_frame(&mut self, host: &mut dyn PageHost) -> bool {
        if self.pending_frame.is_some() {
            return false;
        }
        self.pending_frame = Some(host.request_frame());
        true
    }

    pub fn cancel_frame(&mut self, host: &mut dyn PageHost) {
        if let Some(handle) = self.pending_frame.take() {
            host.cancel_frame(handle);
        }
    }

    /// Animation-frame callback: one hit-test at the last pointer position.
    pub fn on_frame(
        &mut self,
        host: &mut dyn PageHost,
        cell: &mut TargetCell,
        config: &ControllerConfig,
    ) {
        self.pending_frame = None;
        if self.capture_in_progress {
            return;
        }
        if !cell.is_frozen() {
            if let Some(point) = self.last_pointer {
                if cell.set_hover(resolve_at(host, point)) {
                    log::trace!("[OVERLAY] Hover target -> {:?}", cell.hover());
                }
            }
        }
        self.render(host, cell, config, false);
    }

    /// Resolve at `point` (unless frozen) and re-lay out the readout.
    pub fn recompute_at(
        &mut self,
        host: &mut dyn PageHost,
        cell: &mut TargetCell,
        config: &ControllerConfig,
        point: Point,
    ) {
        if self.capture_in_progress {
            return;
        }
        if !cell.is_frozen() {
            cell.set_hover(resolve_at(host, point));
        }
        self.render(host, cell, config, true);
    }

    /// Draw the highlight over the current target.
    ///
    /// The readout is only re-rendered and re-placed when the target or its
    /// frozen flag changed, or when `force` is set.
    pub fn render(
        &mut self,
        host: &mut dyn PageHost,
        cell: &TargetCell,
        config: &ControllerConfig,
        force: bool,
    ) {
        if self.capture_in_progress {
            return;
        }
        let target = cell
            .current()
            .filter(|node| host.is_connected(*node))
            .and_then(|node| Some((node, host.bounding_rect(node)?)));
        let Some((node, rect)) = target else {
            self.readout_for = None;
            for kind in chrome() {
                host.set_surface_visible(kind, false);
            }
            return;
        };

        let frozen = cell.is_frozen();
        host.render_surface(
            SurfaceKind::Highlight,
            &SurfaceContent::Highlight { rect, frozen },
        );
        host.set_surface_visible(SurfaceKind::Highlight, true);

        let identity = Some((node, frozen));
        if force || self.readout_for != identity {
            let text = match &self.status {
                Some(status) => status.clone(),
                None => readout_text(host, node, rect, frozen, config.intent_text_max),
            };
            host.render_surface(SurfaceKind::Metadata, &SurfaceContent::Metadata { text });
            let size = host.measure_surface(SurfaceKind::Metadata);
            let at = readout_position(size, rect, host.viewport().size, config.metadata_gap);
            host.place_surface(SurfaceKind::Metadata, at);
            self.readout_for = identity;
        }
        host.set_surface_visible(SurfaceKind::Metadata, true);
    }

    /// Show or hide highlight and readout. Refused while capturing.
    pub fn set_chrome_visible(&mut self, host: &mut dyn PageHost, visible: bool) -> bool {
        if self.capture_in_progress {
            return false;
        }
        for kind in chrome() {
            host.set_surface_visible(kind, visible);
        }
        true
    }

    /// Hide the chrome and gate all further drawing until [`end_capture`].
    ///
    /// [`end_capture`]: Overlay::end_capture
    pub fn begin_capture(&mut self, host: &mut dyn PageHost) {
        for kind in chrome() {
            host.set_surface_visible(kind, false);
        }
        self.capture_in_progress = true;
        self.status = Some(CAPTURING_TEXT.to_string());
        host.render_surface(
            SurfaceKind::Metadata,
            &SurfaceContent::Metadata {
                text: CAPTURING_TEXT.to_string(),
            },
        );
    }

    pub fn end_capture(&mut self) {
        self.capture_in_progress = false;
    }

    /// Drop the status text. Returns true if there was one.
    pub fn clear_status(&mut self) -> bool {
        self.status.take().is_some()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Forget everything; used on leave.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
