//! The single shared "what is currently targeted" cell.
//!
//! Hover tracking, the freeze key, both menus and the capture pipeline all
//! read and write the same target. Menus go through the pin/unpin pair,
//! which saves the prior freeze state exactly once per menu session and
//! restores it exactly once on close.

use crate::host::NodeId;

/// Freeze state saved when a menu pins its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinSnapshot {
    pub was_frozen: bool,
    pub previous_frozen: Option<NodeId>,
}

/// Hover target, frozen target and the outstanding menu pin.
#[derive(Debug, Clone, Default)]
pub struct TargetCell {
    hover: Option<NodeId>,
    frozen: Option<NodeId>,
    is_frozen: bool,
    menu_pin: Option<PinSnapshot>,
    /// Most recent capture target, kept for out-of-band marking.
    last_captured: Option<NodeId>,
}

impl TargetCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// The authoritative target: the frozen one while frozen, else the hover one.
    pub fn current(&self) -> Option<NodeId> {
        if self.is_frozen {
            self.frozen
        } else {
            self.hover
        }
    }

    pub fn hover(&self) -> Option<NodeId> {
        self.hover
    }

    pub fn is_frozen(&self) -> bool {
        self.is_frozen
    }

    pub fn has_menu_pin(&self) -> bool {
        self.menu_pin.is_some()
    }

    pub fn menu_pin(&self) -> Option<PinSnapshot> {
        self.menu_pin
    }

    /// Record a new hover target. Returns true if it changed.
    pub fn set_hover(&mut self, node: Option<NodeId>) -> bool {
        let changed = self.hover != node;
        self.hover = node;
        changed
    }

    /// Pin the current hover target. No-op without a hover target.
    pub fn freeze(&mut self) -> bool {
        match self.hover {
            Some(node) => {
                self.freeze_on(node);
                true
            }
            None => false,
        }
    }

    pub fn freeze_on(&mut self, node: NodeId) {
        self.is_frozen = true;
        self.frozen = Some(node);
    }

    /// Freeze-key release. A menu's outstanding pin wins over the key.
    pub fn release_key_freeze(&mut self) -> bool {
        if self.has_menu_pin() {
            return false;
        }
        self.unfreeze();
        true
    }

    pub fn unfreeze(&mut self) {
        self.is_frozen = false;
        self.frozen = None;
    }

    /// Pin `node` for a menu session.
    ///
    /// The first pin of a session saves the prior freeze state; later pins
    /// (a second menu, a re-target) reuse that snapshot.
    pub fn pin_for_menu(&mut self, node: NodeId) {
        if self.menu_pin.is_none() {
            self.menu_pin = Some(PinSnapshot {
                was_frozen: self.is_frozen,
                previous_frozen: if self.is_frozen { self.frozen } else { None },
            });
        }
        self.freeze_on(node);
    }

    /// End the menu session, restoring the saved freeze state.
    pub fn unpin_menu(&mut self) -> bool {
        match self.menu_pin.take() {
            Some(snapshot) => {
                self.is_frozen = snapshot.was_frozen;
                self.frozen = snapshot.previous_frozen;
                true
            }
            None => false,
        }
    }

    /// Post-capture release: drop every claim on the target.
    pub fn release(&mut self) {
        self.menu_pin = None;
        self.unfreeze();
    }

    pub fn set_last_captured(&mut self, node: NodeId) {
        self.last_captured = Some(node);
    }

    pub fn last_captured(&self) -> Option<NodeId> {
        self.last_captured
    }

    /// Forget everything, including the last captured node.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
