//! WasmSession: the presentation boundary exposed to JavaScript
//!
//! ```javascript
//! import { WasmSession } from 'btcsession';
//!
//! const session = new WasmSession();
//! session.onLog((entry) => render(entry));
//! if (!(await session.start())) showNoProvider();
//! await session.connect();
//! await session.signTransaction();
//! ```

use futures::StreamExt;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use super::host::BrowserHost;
use super::log;
use super::provider::InjectedProvider;
use crate::core::config::SessionConfig;
use crate::core::locator::ProviderLocator;
use crate::core::session::SessionController;

fn to_js<T: Serialize>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub struct WasmSession {
    session: SessionController<InjectedProvider>,
    locator: ProviderLocator,
}

#[wasm_bindgen]
impl WasmSession {
    /// Session targeting `window.phantom.bitcoin` with default settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_config(&SessionConfig::default())
    }

    /// Create a session from JSON config (missing fields use defaults)
    #[wasm_bindgen(js_name = "fromConfig")]
    pub fn from_config(config_json: &str) -> Result<WasmSession, JsValue> {
        let config = SessionConfig::from_json(config_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::with_config(&config))
    }

    /// Wait for injection, find the provider and subscribe to its events.
    /// Resolves to false when the no-provider fallback should be shown.
    #[wasm_bindgen]
    pub async fn start(&self) -> bool {
        let host = BrowserHost::new();
        match self.session.start(&host, &self.locator).await {
            Some(stream) => {
                let session = self.session.clone();
                spawn_local(async move { session.run_events(stream).await });
                log!("[WasmSession] provider ready");
            }
            None => log!("[WasmSession] no provider ({:?})", self.session.phase()),
        }
        self.session.has_provider()
    }

    #[wasm_bindgen]
    pub async fn connect(&self) {
        self.session.connect().await;
    }

    /// Pick up an already-granted account without prompting
    #[wasm_bindgen]
    pub async fn restore(&self) {
        self.session.restore().await;
    }

    #[wasm_bindgen(js_name = "signTransaction")]
    pub async fn sign_transaction(&self) {
        self.session.sign_transaction().await;
    }

    #[wasm_bindgen(js_name = "clearLogs")]
    pub fn clear_logs(&self) {
        self.session.clear_logs();
    }

    /// `{ phase, address, connectedMethods, logs }`
    #[wasm_bindgen]
    pub fn view(&self) -> JsValue {
        to_js(&self.session.view())
    }

    #[wasm_bindgen(getter)]
    pub fn address(&self) -> Option<String> {
        self.session.account().map(|a| a.address)
    }

    #[wasm_bindgen(getter, js_name = "hasProvider")]
    pub fn has_provider(&self) -> bool {
        self.session.has_provider()
    }

    #[wasm_bindgen(getter, js_name = "showsFallback")]
    pub fn shows_fallback(&self) -> bool {
        self.session.phase().shows_fallback()
    }

    /// Call `callback(entry)` for every log entry appended from now on
    #[wasm_bindgen(js_name = "onLog")]
    pub fn on_log(&self, callback: js_sys::Function) {
        let mut rx = self.session.watch_logs();
        spawn_local(async move {
            while let Some(entry) = rx.next().await {
                let _ = callback.call1(&JsValue::NULL, &to_js(&entry));
            }
        });
    }
}

impl WasmSession {
    fn with_config(config: &SessionConfig) -> Self {
        Self {
            session: SessionController::new(config),
            locator: ProviderLocator::new(config),
        }
    }
}

impl Default for WasmSession {
    fn default() -> Self {
        Self::new()
    }
}
