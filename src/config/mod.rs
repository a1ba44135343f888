//! Controller configuration management.
//!
//! Timing contracts, placement constants and input bindings live in one typed
//! struct behind a `parking_lot::RwLock`, so an embedder can batch-update
//! them from the extension's settings page in a single message.

pub mod controller;

pub use controller::{ControllerConfig, CONTROLLER_CONFIG};
