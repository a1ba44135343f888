//! Capture controller configuration.
//!
//! The defaults are the behavioral contract: a 1.2s acknowledgment window,
//! an 8×8 minimum region, five child candidates.

use std::time::Duration;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Centralized controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ControllerConfig {
    /// `KeyboardEvent.key` value that freezes the hover target while held.
    pub freeze_key: String,

    /// Bounded wait for the `capture` / `region-capture` acknowledgment.
    pub send_timeout_ms: u64,

    /// Bounded wait for the `duplicate-check` answer. Expiry proceeds with capture.
    pub duplicate_check_timeout_ms: u64,

    /// Delay before overlay chrome comes back after a capture.
    /// Must outlast the external screenshot pipeline.
    pub chrome_restore_delay_ms: u64,

    /// Delay before the metadata readout text is re-rendered after a capture.
    pub metadata_restore_delay_ms: u64,

    /// How long a notice stays on screen.
    pub notice_duration_ms: u64,

    /// Vertical gap between a target and its metadata readout.
    pub metadata_gap: f64,

    /// Minimum distance between a menu and the viewport edge.
    pub menu_margin: f64,

    /// Gap between a target box and a menu anchored to it.
    pub menu_anchor_gap: f64,

    /// Smallest region selection (both axes) that triggers a capture.
    pub min_region_size: f64,

    /// Most children listed by the capture-options menu.
    pub max_child_candidates: usize,

    /// Character cap for accessible names and text previews.
    pub intent_text_max: usize,

    /// Inset of the corner hit-test points from the bounding box edges.
    pub hit_point_inset: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            freeze_key: "Alt".to_string(),
            send_timeout_ms: 1200,
            duplicate_check_timeout_ms: 1200,
            chrome_restore_delay_ms: 400,
            metadata_restore_delay_ms: 1500,
            notice_duration_ms: 2400,
            metadata_gap: 8.0,
            menu_margin: 8.0,
            menu_anchor_gap: 6.0,
            min_region_size: 8.0,
            max_child_candidates: 5,
            intent_text_max: 80,
            hit_point_inset: 4.0,
        }
    }
}

impl ControllerConfig {
    /// Validate and clamp settings to acceptable ranges.
    pub fn validate(&mut self) {
        if self.freeze_key.trim().is_empty() {
            self.freeze_key = Self::default().freeze_key;
        }
        self.send_timeout_ms = self.send_timeout_ms.clamp(100, 30_000);
        self.duplicate_check_timeout_ms = self.duplicate_check_timeout_ms.clamp(100, 30_000);
        self.chrome_restore_delay_ms = self.chrome_restore_delay_ms.clamp(0, 5_000);
        // Text restoration never runs before the chrome is back
        self.metadata_restore_delay_ms = self
            .metadata_restore_delay_ms
            .clamp(self.chrome_restore_delay_ms, 10_000);
        self.notice_duration_ms = self.notice_duration_ms.clamp(500, 15_000);
        self.metadata_gap = self.metadata_gap.clamp(0.0, 64.0);
        self.menu_margin = self.menu_margin.clamp(0.0, 64.0);
        self.menu_anchor_gap = self.menu_anchor_gap.clamp(0.0, 64.0);
        self.min_region_size = self.min_region_size.clamp(1.0, 256.0);
        self.max_child_candidates = self.max_child_candidates.clamp(1, 20);
        self.intent_text_max = self.intent_text_max.clamp(8, 1_000);
        self.hit_point_inset = self.hit_point_inset.clamp(0.0, 32.0);
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn duplicate_check_timeout(&self) -> Duration {
        Duration::from_millis(self.duplicate_check_timeout_ms)
    }

    pub fn chrome_restore_delay(&self) -> Duration {
        Duration::from_millis(self.chrome_restore_delay_ms)
    }

    pub fn metadata_restore_delay(&self) -> Duration {
        Duration::from_millis(self.metadata_restore_delay_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }

    /// Reset all settings to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

lazy_static! {
    /// Global controller configuration.
    ///
    /// New controllers snapshot this at construction; a running controller
    /// keeps the values it started with.
    pub static ref CONTROLLER_CONFIG: RwLock<ControllerConfig> = RwLock::new(ControllerConfig::default());
}

/// Get a copy of the current configuration.
pub fn get_controller_config() -> ControllerConfig {
    CONTROLLER_CONFIG.read().clone()
}

/// Replace the configuration, clamping out-of-range values.
pub fn set_controller_config(mut config: ControllerConfig) {
    config.validate();
    log::debug!("[CONFIG] Controller config updated: {:?}", config);
    *CONTROLLER_CONFIG.write() = config;
}

/// Reset the configuration to defaults.
pub fn reset_controller_config() {
    CONTROLLER_CONFIG.write().reset();
    log::debug!("[CONFIG] Controller config reset to defaults");
}
