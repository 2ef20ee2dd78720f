//! btcsession: session controller for browser-injected Bitcoin wallets.
//!
//! # Architecture
//!
//! ```text
//! Presentation (JS)
//!   │  intents: connect, signTransaction, clearLogs
//!   ▼
//! SessionController ──► ProviderLocator ──► Host (window / mock)
//!   │         │
//!   │         └──────► SigningGateway ──► BitcoinProvider::sign_psbt
//!   │
//!   ◄── ProviderEvent stream (accountsChanged, chainChanged)
//!   │
//!   └── SessionView + LogEntry feed back to presentation
//! ```
//!
//! # Operations
//!
//! | Operation | Method | Effect |
//! |-----------|--------|--------|
//! | discover | `session.start(host, locator)` | grace delay, locate, subscribe |
//! | connect | `session.connect()` | `requestAccounts`, set account |
//! | sign | `session.sign_transaction()` | `signPSBT` on the fixed request |
//! | clear | `session.clear_logs()` | empty the log |
//! | events | `session.run_events(stream)` | apply provider events |
//!
//! # Features
//!
//! - `native` - tokio `LocalSet` driver, tracing-subscriber logging
//! - `wasm` - wasm-bindgen bindings to `window.phantom.bitcoin`
//! - `bitcoin` - decode the signing payload as a PSBT before sending
//! - `testing` - `MockProvider` / `MockHost` for driving a session in tests
//!
//! # Usage
//!
//! ```ignore
//! use btcsession::{start_session, SessionConfig};
//! use btcsession::testing::{MockHost, MockProvider};
//!
//! let host = MockHost::with_provider(MockProvider::new());
//! let (session, _events) = start_session(&host, &SessionConfig::new()).await;
//! session.connect().await;
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod core;

/// Scripted provider and host. Unit tests get them automatically; other
/// consumers opt in with the `testing` feature.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// =============================================================================
// Native-only modules (tokio, tracing-subscriber)
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;
#[cfg(feature = "native")]
pub mod runtime;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports: Shared
// =============================================================================
pub use crate::core::config::SessionConfig;
pub use crate::core::error::{SessionError, SessionResult};
pub use crate::core::gateway::{SigningGateway, SigningRequest};
pub use crate::core::locator::{Host, ProviderLocator};
pub use crate::core::provider::{BitcoinProvider, EventStream};
pub use crate::core::session::{LogFeed, SessionController};
pub use crate::core::types::{
    Account, ConnectedMethod, LogEntry, LogMethod, LogStatus, ProviderEvent, SessionPhase,
    SessionView, SignPsbtOptions,
};

// =============================================================================
// Re-exports: Native
// =============================================================================
#[cfg(feature = "native")]
pub use runtime::{spawn_event_loop, start_session};

// =============================================================================
// Re-exports: WASM
// =============================================================================
#[cfg(feature = "wasm")]
pub use wasm::{BrowserHost, InjectedProvider, WasmSession};
