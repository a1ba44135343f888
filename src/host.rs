//! Host page capability set.
//!
//! The controller never touches a DOM directly. Everything it needs from the
//! page (queries, isolated render surfaces, listener registration, animation
//! frames) goes through [`PageHost`], and every suspension point goes through
//! [`Scheduler`]. The browser binding implements both over `web-sys`; tests
//! implement them over an in-memory document.

use std::time::Duration;

use futures::future::LocalBoxFuture;

use crate::capture::conditions::Theme;
use crate::geometry::{Point, Rect, Size};
use crate::menu::MenuView;

/// Weak, non-owning handle to a page element.
///
/// Holding a `NodeId` never keeps the element alive; ask the host with
/// [`PageHost::is_connected`] before trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Handle for a scheduled animation-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// The isolated surfaces the controller renders on top of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Box drawn over the current target
    Highlight,
    /// Small readout describing the current target
    Metadata,
    /// Capture-variant menu for native interactive elements
    StateMenu,
    /// Capture-options menu (exact/parent/semantic/child/region/viewport)
    OptionsMenu,
    /// Full-viewport drag layer of the region tool
    RegionSelect,
    /// Duplicate confirmation prompt
    Confirm,
    /// Transient, auto-dismissing notice
    Notice,
}

impl SurfaceKind {
    /// Teardown order used when leaving capture mode.
    pub const ALL: [SurfaceKind; 7] = [
        SurfaceKind::Highlight,
        SurfaceKind::Metadata,
        SurfaceKind::StateMenu,
        SurfaceKind::OptionsMenu,
        SurfaceKind::RegionSelect,
        SurfaceKind::Confirm,
        SurfaceKind::Notice,
    ];

    /// Surfaces that follow the hover target.
    pub fn is_chrome(&self) -> bool {
        matches!(self, Self::Highlight | Self::Metadata)
    }

    pub fn is_menu(&self) -> bool {
        matches!(self, Self::StateMenu | Self::OptionsMenu)
    }
}

/// Viewport facts read at a single instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportInfo {
    pub size: Size,
    pub device_pixel_ratio: f64,
    /// Pinch-zoom scale when the platform exposes one.
    pub visual_scale: Option<f64>,
}

impl Default for ViewportInfo {
    fn default() -> Self {
        Self {
            size: Size::default(),
            device_pixel_ratio: 1.0,
            visual_scale: None,
        }
    }
}

/// What a surface should currently display.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceContent {
    Highlight { rect: Rect, frozen: bool },
    Metadata { text: String },
    Menu(MenuView),
    Region { rect: Option<Rect> },
    Confirm { message: String },
    Notice { message: String },
}

/// Document queries plus the render-surface capability set.
pub trait PageHost {
    // ------------------------------------------------------------------
    // Document
    // ------------------------------------------------------------------

    fn url(&self) -> String;

    fn viewport(&self) -> ViewportInfo;

    /// Color scheme the page or platform reports, if any.
    fn theme_hint(&self) -> Theme {
        Theme::Unknown
    }

    /// Every element under the point, topmost first, including elements that
    /// do not receive pointer events.
    fn elements_from_point(&self, point: Point) -> Vec<NodeId>;

    fn document_element(&self) -> Option<NodeId>;

    fn body(&self) -> Option<NodeId>;

    fn is_connected(&self, node: NodeId) -> bool;

    /// Upper-case tag name (`"BUTTON"`).
    fn tag_name(&self, node: NodeId) -> String;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn inner_text(&self, node: NodeId) -> Option<String>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn bounding_rect(&self, node: NodeId) -> Option<Rect>;

    /// Resolved value of a CSS property.
    fn computed_style(&self, node: NodeId, property: &str) -> Option<String>;

    /// Value as authored (inline style or matched rule), before variable
    /// substitution.
    fn authored_style(&self, node: NodeId, property: &str) -> Option<String>;

    fn is_disabled(&self, node: NodeId) -> bool {
        self.attribute(node, "disabled").is_some()
    }

    fn is_checked(&self, node: NodeId) -> Option<bool> {
        let _ = node;
        None
    }

    /// True for nodes belonging to one of the controller's own surfaces.
    fn owns_node(&self, node: NodeId) -> bool;

    // ------------------------------------------------------------------
    // Out-of-band markers
    // ------------------------------------------------------------------

    fn set_marker(&mut self, node: NodeId, marker_id: &str) -> bool;

    /// Remove the marker if `node` still carries `marker_id`.
    fn clear_marker(&mut self, node: NodeId, marker_id: &str) -> bool;

    // ------------------------------------------------------------------
    // Surfaces
    // ------------------------------------------------------------------

    fn mount_surface(&mut self, kind: SurfaceKind);

    fn unmount_surface(&mut self, kind: SurfaceKind);

    fn is_mounted(&self, kind: SurfaceKind) -> bool;

    fn render_surface(&mut self, kind: SurfaceKind, content: &SurfaceContent);

    /// Rendered size of a surface; call after `render_surface`.
    fn measure_surface(&self, kind: SurfaceKind) -> Size;

    fn place_surface(&mut self, kind: SurfaceKind, at: Point);

    fn set_surface_visible(&mut self, kind: SurfaceKind, visible: bool);

    fn is_surface_visible(&self, kind: SurfaceKind) -> bool;

    // ------------------------------------------------------------------
    // Input and frames
    // ------------------------------------------------------------------

    /// Register capture-phase listeners for pointer, click, context-menu and
    /// key events on the page.
    fn attach_listeners(&mut self);

    fn detach_listeners(&mut self);

    /// Schedule one `Controller::on_frame` call before the next repaint.
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Suspension points of the capture lifecycle.
pub trait Scheduler {
    /// Resolve after the next rendering frame.
    fn next_frame(&self) -> LocalBoxFuture<'static, ()>;

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Off-screen position used to measure a surface before placing it.
pub const OFFSCREEN: Point = Point {
    x: -10_000.0,
    y: -10_000.0,
};
