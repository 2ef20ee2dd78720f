//! Path and name constants for the injected provider
//!
//! Centralized registry for the provider namespace, request method names and
//! event names. Log tags live on `LogMethod` as serde names.

/// Where the provider is injected on the host's global object
pub mod provider {
    pub const NAMESPACE: &[&str] = &["phantom", "bitcoin"];
    pub const INSTALL_URL: &str = "https://phantom.app/";
    pub const INSTALL_TARGET: &str = "_blank";
}

/// Provider request methods (JS property names)
pub mod methods {
    pub const REQUEST_ACCOUNTS: &str = "requestAccounts";
    pub const GET_ACCOUNTS: &str = "getAccounts";
    pub const SIGN_PSBT: &str = "signPSBT";
    pub const ON: &str = "on";
}

/// Provider event names
pub mod events {
    pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
    pub const CHAIN_CHANGED: &str = "chainChanged";
}

/// Discovery grace period before the first lookup
pub const GRACE_PERIOD_MS: u64 = 100;

/// Fixed demonstration PSBT: one input, one P2WPKH output of 10 000 sats.
pub const DEMO_PSBT_HEX: &str = concat!(
    "70736274ff",
    "010052",
    "02000000",
    "01",
    "5e0b8c5d3b1f07c2a8e6d4f2b09c7e5a3f1d8b6c4a2e0f9d7b5c3a1e8f6d4b2c",
    "00000000",
    "00",
    "ffffffff",
    "01",
    "1027000000000000",
    "160014",
    "751e76e8199196d454941c45d1b3a323f1433bd6",
    "00000000",
    "00",
    "00",
    "00",
);

/// PSBT magic bytes: "psbt" followed by 0xff
pub const PSBT_MAGIC: &[u8] = b"psbt\xff";
