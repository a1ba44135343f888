//! Menu placement: measure off-screen, then clamp and flip into view.

use crate::geometry::{Point, Rect, Size};
use crate::host::{PageHost, SurfaceContent, SurfaceKind, OFFSCREEN};

/// Where a menu hangs from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// The pointer position that triggered the menu
    Point(Point),
    /// Below a target's bounding box
    Below(Rect),
}

/// Top-left corner for a menu of `size`.
///
/// The menu goes below the anchor; when that overflows the bottom margin it
/// flips above. The result is clamped to `margin` on every side.
pub fn menu_position(size: Size, anchor: Anchor, viewport: Size, margin: f64, gap: f64) -> Point {
    let (x, below, above) = match anchor {
        Anchor::Point(p) => (p.x, p.y, p.y - size.height),
        Anchor::Below(rect) => (
            rect.left,
            rect.bottom() + gap,
            rect.top - gap - size.height,
        ),
    };
    let fits_below = below + size.height <= viewport.height - margin;
    let y = if fits_below || above < margin {
        below
    } else {
        above
    };
    Point::new(
        clamp_axis(x, size.width, viewport.width, margin),
        clamp_axis(y, size.height, viewport.height, margin),
    )
}

fn clamp_axis(pos: f64, extent: f64, limit: f64, margin: f64) -> f64 {
    let max = (limit - margin - extent).max(margin);
    pos.clamp(margin, max)
}

/// Render `content` off-screen, measure it, then place it at its final spot.
pub fn show_measured(
    host: &mut dyn PageHost,
    kind: SurfaceKind,
    content: &SurfaceContent,
    anchor: Anchor,
    margin: f64,
    gap: f64,
) -> Point {
    host.place_surface(kind, OFFSCREEN);
    host.render_surface(kind, content);
    host.set_surface_visible(kind, true);
    let size = host.measure_surface(kind);
    let at = menu_position(size, anchor, host.viewport().size, margin, gap);
    host.place_surface(kind, at);
    log::debug!("[MENU] {:?} placed at ({:.0}, {:.0})", kind, at.x, at.y);
    at
}
