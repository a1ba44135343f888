//! Input routing.
//!
//! Every page-level event is routed once, through a fixed priority table,
//! to exactly one owner. Open modal surfaces come first; the hover overlay
//! owns whatever is left.

use crate::geometry::Point;
use crate::host::SurfaceKind;

/// Primary (left) pointer button.
pub const PRIMARY_BUTTON: i16 = 0;

/// Secondary (right) pointer button.
pub const SECONDARY_BUTTON: i16 = 2;

pub const ESCAPE_KEY: &str = "Escape";

/// A page-level input event as seen by the capture-phase listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMove {
        point: Point,
    },
    PointerDown {
        point: Point,
        button: i16,
        /// Controller surface the event path passes through, if any
        surface: Option<SurfaceKind>,
    },
    PointerUp {
        point: Point,
        button: i16,
        surface: Option<SurfaceKind>,
    },
    Click {
        point: Point,
        button: i16,
        surface: Option<SurfaceKind>,
    },
    ContextMenu {
        point: Point,
        surface: Option<SurfaceKind>,
    },
    KeyDown {
        key: String,
        repeat: bool,
    },
    KeyUp {
        key: String,
    },
}

impl InputEvent {
    pub fn point(&self) -> Option<Point> {
        match self {
            Self::PointerMove { point }
            | Self::PointerDown { point, .. }
            | Self::PointerUp { point, .. }
            | Self::Click { point, .. }
            | Self::ContextMenu { point, .. } => Some(*point),
            Self::KeyDown { .. } | Self::KeyUp { .. } => None,
        }
    }

    pub fn surface(&self) -> Option<SurfaceKind> {
        match self {
            Self::PointerDown { surface, .. }
            | Self::PointerUp { surface, .. }
            | Self::Click { surface, .. }
            | Self::ContextMenu { surface, .. } => *surface,
            _ => None,
        }
    }

    pub fn is_escape(&self) -> bool {
        matches!(self, Self::KeyDown { key, .. } if key == ESCAPE_KEY)
    }

    /// Pointer-down, click or context-menu: the events that dismiss menus.
    pub fn is_press(&self) -> bool {
        matches!(
            self,
            Self::PointerDown { .. } | Self::Click { .. } | Self::ContextMenu { .. }
        )
    }
}

/// Who handles an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    RegionSelect,
    Confirm,
    OptionsMenu,
    StateMenu,
    Overlay,
}

/// Priority order. Escape closes surfaces in this order too.
pub const DISPATCH_ORDER: [Owner; 5] = [
    Owner::RegionSelect,
    Owner::Confirm,
    Owner::OptionsMenu,
    Owner::StateMenu,
    Owner::Overlay,
];

/// Which modal surfaces are open right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenSurfaces {
    pub region_select: bool,
    pub confirm: bool,
    pub options_menu: bool,
    pub state_menu: bool,
}

impl OpenSurfaces {
    pub fn is_open(&self, owner: Owner) -> bool {
        match owner {
            Owner::RegionSelect => self.region_select,
            Owner::Confirm => self.confirm,
            Owner::OptionsMenu => self.options_menu,
            Owner::StateMenu => self.state_menu,
            Owner::Overlay => true,
        }
    }

    pub fn any_modal(&self) -> bool {
        self.region_select || self.confirm || self.options_menu || self.state_menu
    }
}

/// First owner in [`DISPATCH_ORDER`] that is open.
pub fn route(open: &OpenSurfaces) -> Owner {
    if !open.any_modal() {
        return Owner::Overlay;
    }
    DISPATCH_ORDER
        .into_iter()
        .find(|owner| open.is_open(*owner))
        .unwrap_or(Owner::Overlay)
}

/// What the binding does with the native event after the controller saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Leave the event alone; the page sees it
    PassThrough,
    /// Prevent the default action and stop propagation
    Block,
    /// Let it continue into one of our own surfaces, but not the page
    ToSurface,
}
