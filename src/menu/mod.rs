//! Contextual menus.
//!
//! Two small state machines share one pin protocol on the target cell and
//! one placement routine. Their views are plain data; the host renders them.

pub mod options_menu;
pub mod placement;
pub mod state_menu;

pub use options_menu::{ChildEntry, OptionsMenu, OptionsMenuSession, OptionsPage};
pub use placement::{menu_position, show_measured, Anchor};
pub use state_menu::{StateMenu, StateMenuSession, StateVariant};

/// Everything a menu item can ask the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    /// State menu: capture with the given variant
    Variant(StateVariant),
    CaptureExact,
    CaptureParent,
    CaptureSemantic,
    /// Switch the options menu to its children view
    ShowChildren,
    /// Index into the children view
    CaptureChild(usize),
    Back,
    StartRegion,
    StartViewport,
    ToggleFreeze,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemView {
    pub action: MenuAction,
    pub label: String,
    pub enabled: bool,
}

impl MenuItemView {
    pub fn new(action: MenuAction, label: impl Into<String>, enabled: bool) -> Self {
        Self {
            action,
            label: label.into(),
            enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuView {
    pub title: String,
    pub items: Vec<MenuItemView>,
}

impl MenuView {
    pub fn item(&self, action: MenuAction) -> Option<&MenuItemView> {
        self.items.iter().find(|item| item.action == action)
    }

    /// Present and enabled.
    pub fn is_enabled(&self, action: MenuAction) -> bool {
        self.item(action).is_some_and(|item| item.enabled)
    }
}
