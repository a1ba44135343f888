//! WASM page bridge
//!
//! Runs the evidence capture controller inside a content script: the live DOM
//! is the page host, `requestAnimationFrame`/`setTimeout` drive the scheduler
//! and `chrome.runtime.sendMessage` carries service calls.

mod markup;
mod page;
mod runtime;

use std::cell::RefCell;
use std::rc::Rc;

use evidence_capture_lib::config::controller::get_controller_config;
use evidence_capture_lib::{Controller, ControllerConfig, MessageService};
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use page::WebPage;
pub use runtime::{RuntimeTransport, WebScheduler};

/// Initialize panic hook and logging for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("[PageBridge] WASM module initialized");
}

/// Capture controller bound to the current document.
#[wasm_bindgen]
pub struct CaptureController {
    inner: Controller,
}

#[wasm_bindgen]
impl CaptureController {
    /// `config` is an optional partial `ControllerConfig`; missing fields
    /// take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CaptureController, JsValue> {
        let config: ControllerConfig = if config.is_undefined() || config.is_null() {
            get_controller_config()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| format!("Invalid config: {}", e))?
        };

        let slot = Rc::new(RefCell::new(None));
        let page = WebPage::new(Rc::clone(&slot))?;
        let inner = Controller::with_config(
            Box::new(page),
            Box::new(MessageService::new(RuntimeTransport)),
            Box::new(WebScheduler),
            config,
        );
        *slot.borrow_mut() = Some(inner.downgrade());
        log::info!("[PageBridge] Controller ready");
        Ok(Self { inner })
    }

    /// Flip capture mode, or force it with `enabled`. Returns the new state.
    pub fn toggle(&self, enabled: Option<bool>) -> bool {
        self.inner.toggle(enabled)
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Answer a control message from the extension runtime.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&self, message: JsValue) -> Result<JsValue, JsValue> {
        let message: serde_json::Value =
            serde_wasm_bindgen::from_value(message).map_err(|e| format!("Invalid message: {}", e))?;
        let reply = self
            .inner
            .handle_message_json(message)
            .map_err(|e| e.to_string())?;
        reply
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Leave capture mode and remove every surface.
    pub fn dispose(&self) {
        self.inner.leave();
    }
}
