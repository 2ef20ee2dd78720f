//! BrowserHost - the page's `window` as provider host

use async_trait::async_trait;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::log;
use super::provider::InjectedProvider;
use crate::core::locator::Host;

#[derive(Clone, Default)]
pub struct BrowserHost;

impl BrowserHost {
    pub fn new() -> Self { Self }
}

#[async_trait(?Send)]
impl Host for BrowserHost {
    type Provider = InjectedProvider;

    fn find_provider(&self, path: &[String]) -> Option<InjectedProvider> {
        let window = web_sys::window()?;
        let mut current: JsValue = window.into();
        for segment in path {
            current = js_sys::Reflect::get(&current, &JsValue::from_str(segment)).ok()?;
            if current.is_undefined() || current.is_null() {
                return None;
            }
        }
        current.dyn_into::<js_sys::Object>().ok().map(InjectedProvider::new)
    }

    fn open_url(&self, url: &str, target: &str) {
        let Some(window) = web_sys::window() else { return };
        if let Err(e) = window.open_with_url_and_target(url, target) {
            log!("[BrowserHost] window.open failed: {:?}", e);
        }
    }

    async fn sleep(&self, duration: Duration) {
        let Some(window) = web_sys::window() else { return };
        let ms = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            if window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                .is_err()
            {
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        let _ = JsFuture::from(promise).await;
    }
}
