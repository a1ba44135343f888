//! In-page evidence capture controller.
//!
//! Lets a user point at any element of a live page, pin it, pick a capture
//! variant and hand a structured record (style primitives, intent,
//! conditions) to a persistence service. The crate is host-agnostic: the page
//! is reached through [`host::PageHost`], time through [`host::Scheduler`] and
//! the service through [`service::EvidenceService`]. The browser binding
//! lives in `wasm/page-bridge`.

pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod host;
pub mod menu;
pub mod overlay;
pub mod protocol;
pub mod region;
pub mod router;
pub mod service;
pub mod target;

#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
#[cfg(not(target_arch = "wasm32"))]
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ControllerConfig;
pub use controller::{Controller, EventOutcome, SurfaceAction, Task, WeakController};
pub use error::{CaptureError, CaptureResult};
pub use host::{NodeId, PageHost, Scheduler, SurfaceContent, SurfaceKind};
pub use router::{Disposition, InputEvent};
pub use service::{EvidenceService, MessageService, MessageTransport};
