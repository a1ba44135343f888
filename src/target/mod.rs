//! Target tracking: the shared target cell and hit-test resolution.
//!
//! # Modules
//!
//! - `cell` - Hover/frozen target and the menu pin snapshot
//! - `resolve` - Element-under-pointer resolution, parent/semantic/child lookups

pub mod cell;
pub mod resolve;

pub use cell::{PinSnapshot, TargetCell};
pub use resolve::{capturable_parent, child_candidates, is_root_or_body, resolve_at, semantic_ancestor};
