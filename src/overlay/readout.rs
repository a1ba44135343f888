//! Metadata readout text and placement.

use crate::capture::intent::accessible_name;
use crate::capture::roles::role_of;
use crate::geometry::{Point, Rect, Size};
use crate::host::{NodeId, PageHost};

/// Readout text while a capture is in flight.
pub const CAPTURING_TEXT: &str = "CAPTURING…";

/// Most classes shown after the tag.
const MAX_CLASSES: usize = 2;

/// `button#save.primary.large` style selector-ish label.
pub fn describe_node(host: &dyn PageHost, node: NodeId) -> String {
    let mut label = host.tag_name(node).to_ascii_lowercase();
    if let Some(id) = host.attribute(node, "id").filter(|id| !id.trim().is_empty()) {
        label.push('#');
        label.push_str(id.trim());
    }
    if let Some(classes) = host.attribute(node, "class") {
        for class in classes.split_whitespace().take(MAX_CLASSES) {
            label.push('.');
            label.push_str(class);
        }
    }
    label
}

/// Full readout line for the current target.
pub fn readout_text(
    host: &dyn PageHost,
    node: NodeId,
    rect: Rect,
    frozen: bool,
    text_max: usize,
) -> String {
    let mut text = format!(
        "{} {}×{}",
        describe_node(host, node),
        rect.width.round(),
        rect.height.round()
    );
    if let Some(role) = role_of(host, node) {
        text.push_str(" · ");
        text.push_str(&role);
    }
    if let Some(name) = accessible_name(host, node, text_max) {
        text.push_str(&format!(" \"{name}\""));
    }
    if frozen {
        text.push_str(" [frozen]");
    }
    text
}

/// Above the target when it fits, otherwise below; clamped to the viewport.
pub fn readout_position(size: Size, target: Rect, viewport: Size, gap: f64) -> Point {
    let above = target.top - gap - size.height;
    let y = if above >= 0.0 {
        above
    } else {
        target.bottom() + gap
    };
    Point::new(
        target.left.clamp(0.0, (viewport.width - size.width).max(0.0)),
        y.clamp(0.0, (viewport.height - size.height).max(0.0)),
    )
}
