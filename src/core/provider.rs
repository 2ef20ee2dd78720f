//! BitcoinProvider: the injected wallet's capability surface
//!
//! The wallet owns key material and signing. This crate only sees the
//! request methods and a narrow typed event subscription.

use async_trait::async_trait;
use futures::channel::mpsc;

use super::error::SessionResult;
use super::types::{Account, ProviderEvent, SignPsbtOptions};

/// Stream of provider events for one subscription
pub type EventStream = mpsc::UnboundedReceiver<ProviderEvent>;

#[async_trait(?Send)]
pub trait BitcoinProvider {
    /// Ask the user for access to the selected wallet's account (prompts)
    async fn request_accounts(&self) -> SessionResult<Vec<Account>>;

    /// Silently retrieve accounts already granted
    async fn get_accounts(&self) -> SessionResult<Vec<Account>>;

    /// Sign a hex-encoded PSBT, returning the signed PSBT hex
    async fn sign_psbt(&self, psbt_hex: &str, options: SignPsbtOptions) -> SessionResult<String>;

    /// Register for `accountsChanged` and `chainChanged`
    fn subscribe(&self) -> SessionResult<EventStream>;
}
