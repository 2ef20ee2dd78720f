//! WASM module: browser bindings for the session controller
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         WasmSession (JS API)            │
//! │  start, connect, signTransaction,       │
//! │  clearLogs, view, onLog                 │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │       SessionController (core)          │
//! │  phases, account, log feed              │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │  BrowserHost + InjectedProvider         │
//! │  window.phantom.bitcoin via Reflect     │
//! └─────────────────────────────────────────┘
//! ```

mod host;
mod provider;
mod session;

pub use host::BrowserHost;
pub use provider::InjectedProvider;
pub use session::WasmSession;

use wasm_bindgen::prelude::*;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;

/// Best-effort message text from a thrown JS value or rejected promise
pub(crate) fn js_error_message(err: &JsValue) -> String {
    if let Some(s) = err.as_string() {
        return s;
    }
    js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}
