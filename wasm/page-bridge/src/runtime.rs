//! Browser timers and the extension runtime channel.

use std::time::Duration;

use evidence_capture_lib::error::ResultExt;
use evidence_capture_lib::{CaptureError, CaptureResult, MessageTransport, Scheduler};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    fn runtime_send_message(message: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

/// Render a thrown JS value for logs and error messages.
pub(crate) fn js_error(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Promise resolved by a window callback registered through `register`.
fn window_promise(register: impl Fn(&web_sys::Window, &js_sys::Function) -> Result<i32, JsValue>) -> js_sys::Promise {
    js_sys::Promise::new(&mut |resolve, _reject| {
        let Some(window) = web_sys::window() else {
            let _ = resolve.call0(&JsValue::NULL);
            return;
        };
        if let Err(e) = register(&window, &resolve) {
            log::warn!("[BRIDGE] Timer registration failed: {}", js_error(&e));
            let _ = resolve.call0(&JsValue::NULL);
        }
    })
}

/// [`Scheduler`] over `requestAnimationFrame` and `setTimeout`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebScheduler;

impl Scheduler for WebScheduler {
    fn next_frame(&self) -> LocalBoxFuture<'static, ()> {
        let promise = window_promise(|window, callback| window.request_animation_frame(callback));
        async move {
            let _ = JsFuture::from(promise).await;
        }
        .boxed_local()
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let ms = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = window_promise(move |window, callback| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(callback, ms)
        });
        async move {
            let _ = JsFuture::from(promise).await;
        }
        .boxed_local()
    }
}

/// [`MessageTransport`] over `chrome.runtime.sendMessage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuntimeTransport;

impl MessageTransport for RuntimeTransport {
    fn send(&self, message: serde_json::Value) -> LocalBoxFuture<'static, CaptureResult<serde_json::Value>> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let sent = message
            .serialize(&serializer)
            .map_err(|e| CaptureError::Transport(format!("Could not encode message: {}", e)))
            .and_then(|js| {
                runtime_send_message(&js).map_err(|e| CaptureError::Transport(js_error(&e)))
            });

        async move {
            let promise = sent?;
            let reply = JsFuture::from(promise)
                .await
                .map_err(|e| CaptureError::Transport(js_error(&e)))?;
            if reply.is_undefined() {
                return Err(CaptureError::Transport("No response from extension runtime".to_string()));
            }
            serde_wasm_bindgen::from_value(reply).context("Malformed runtime reply")
        }
        .boxed_local()
    }
}
