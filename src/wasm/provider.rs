//! InjectedProvider - BitcoinProvider over the wallet's injected JS object

use async_trait::async_trait;
use futures::channel::mpsc;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::js_error_message;
use crate::core::error::{SessionError, SessionResult};
use crate::core::paths::{events, methods};
use crate::core::provider::{BitcoinProvider, EventStream};
use crate::core::types::{Account, ProviderEvent, SignPsbtOptions};

type Listener = Closure<dyn FnMut(JsValue)>;

/// Handle to `window.phantom.bitcoin` (or whatever path was configured)
#[derive(Clone)]
pub struct InjectedProvider {
    object: js_sys::Object,
    // Listeners must outlive the session; JS holds only a reference.
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl InjectedProvider {
    pub fn new(object: js_sys::Object) -> Self {
        Self { object, listeners: Rc::new(RefCell::new(Vec::new())) }
    }

    fn method(&self, name: &str) -> SessionResult<js_sys::Function> {
        let value = js_sys::Reflect::get(&self.object, &JsValue::from_str(name))
            .map_err(|e| SessionError::Provider(format!("{}: {}", name, js_error_message(&e))))?;
        value
            .dyn_into::<js_sys::Function>()
            .map_err(|_| SessionError::Provider(format!("{} is not a function", name)))
    }

    /// Call a provider method, awaiting the result if it returned a promise
    async fn call(&self, name: &str, args: &[JsValue]) -> SessionResult<JsValue> {
        let function = self.method(name)?;
        let result = function
            .apply(&self.object, &js_sys::Array::from_iter(args.iter()))
            .map_err(|e| SessionError::Provider(js_error_message(&e)))?;

        if result.has_type::<js_sys::Promise>() {
            let promise: js_sys::Promise = result.unchecked_into();
            JsFuture::from(promise)
                .await
                .map_err(|e| SessionError::Provider(js_error_message(&e)))
        } else {
            Ok(result)
        }
    }

    fn listen(&self, event: &str, listener: Listener) -> SessionResult<()> {
        let on = self.method(methods::ON)?;
        on.call2(&self.object, &JsValue::from_str(event), listener.as_ref())
            .map_err(|e| SessionError::Provider(js_error_message(&e)))?;
        self.listeners.borrow_mut().push(listener);
        Ok(())
    }
}

fn decode_accounts(value: JsValue) -> SessionResult<Vec<Account>> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| SessionError::Provider(format!("invalid accounts: {}", e)))
}

#[async_trait(?Send)]
impl BitcoinProvider for InjectedProvider {
    async fn request_accounts(&self) -> SessionResult<Vec<Account>> {
        decode_accounts(self.call(methods::REQUEST_ACCOUNTS, &[]).await?)
    }

    async fn get_accounts(&self) -> SessionResult<Vec<Account>> {
        decode_accounts(self.call(methods::GET_ACCOUNTS, &[]).await?)
    }

    async fn sign_psbt(&self, psbt_hex: &str, options: SignPsbtOptions) -> SessionResult<String> {
        let options = serde_wasm_bindgen::to_value(&options)
            .map_err(|e| SessionError::Signing(e.to_string()))?;
        let signed = self.call(methods::SIGN_PSBT, &[JsValue::from_str(psbt_hex), options]).await?;
        signed
            .as_string()
            .ok_or_else(|| SessionError::Signing("signPSBT did not return a string".into()))
    }

    fn subscribe(&self) -> SessionResult<EventStream> {
        let (tx, rx) = mpsc::unbounded();

        let accounts_tx = tx.clone();
        let on_accounts = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            // An undecodable payload is as ambiguous as an empty one
            let accounts = serde_wasm_bindgen::from_value::<Vec<Account>>(value).unwrap_or_default();
            let _ = accounts_tx.unbounded_send(ProviderEvent::AccountsChanged(accounts));
        });
        self.listen(events::ACCOUNTS_CHANGED, on_accounts)?;

        let on_chain = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let chain = value.as_string().unwrap_or_else(|| format!("{:?}", value));
            let _ = tx.unbounded_send(ProviderEvent::ChainChanged(chain));
        });
        self.listen(events::CHAIN_CHANGED, on_chain)?;

        Ok(rx)
    }
}
