//! Session Controller - owns provider, account and the log stream
//!
//! # Phases
//!
//! ```text
//! Uninitialized ──discover──► ProviderUnavailable (terminal)
//!       │
//!       └──────────────────► ProviderReady ──connect ok──► Connected
//!                                 ▲                          │
//!                                 └──── connect failed       │ accountsChanged([a])  → switch
//!                                                            │ accountsChanged([]/n) → requestAccounts
//! ```
//!
//! Everything runs on one thread. State lives behind `Rc<RefCell<_>>` and no
//! borrow is held across an `.await`; each operation applies its transition
//! after the provider call resolves.

use futures::channel::mpsc;
use futures::StreamExt;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};

use super::config::SessionConfig;
use super::error::{SessionError, SessionResult};
use super::gateway::SigningGateway;
use super::locator::{Host, ProviderLocator};
use super::provider::{BitcoinProvider, EventStream};
use super::types::{Account, ConnectedMethod, LogEntry, LogMethod, ProviderEvent, SessionPhase, SessionView};

// =============================================================================
// LOG FEED
// =============================================================================

/// Append-only log sequence with push notifications
#[derive(Clone, Default)]
pub struct LogFeed {
    entries: Rc<RefCell<Vec<LogEntry>>>,
    watchers: Rc<RefCell<Vec<mpsc::UnboundedSender<LogEntry>>>>,
}

impl LogFeed {
    pub fn new() -> Self { Self::default() }

    pub fn push(&self, entry: LogEntry) {
        self.entries.borrow_mut().push(entry.clone());
        let mut watchers = self.watchers.borrow_mut();
        watchers.retain(|tx| tx.unbounded_send(entry.clone()).is_ok());
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize { self.entries.borrow().len() }
    pub fn is_empty(&self) -> bool { self.entries.borrow().is_empty() }

    pub fn watch(&self) -> mpsc::UnboundedReceiver<LogEntry> {
        let (tx, rx) = mpsc::unbounded();
        self.watchers.borrow_mut().push(tx);
        rx
    }
}

// =============================================================================
// SESSION CONTROLLER
// =============================================================================

struct SessionState<P> {
    provider: Option<Rc<P>>,
    account: Option<Account>,
    unavailable: bool,
}

impl<P> Default for SessionState<P> {
    fn default() -> Self {
        Self { provider: None, account: None, unavailable: false }
    }
}

/// Single source of truth for the presentation layer. Cheap to clone; clones share state.
pub struct SessionController<P: BitcoinProvider> {
    state: Rc<RefCell<SessionState<P>>>,
    logs: LogFeed,
    gateway: SigningGateway,
}

impl<P: BitcoinProvider> Clone for SessionController<P> {
    fn clone(&self) -> Self {
        Self { state: self.state.clone(), logs: self.logs.clone(), gateway: self.gateway.clone() }
    }
}

impl<P: BitcoinProvider> SessionController<P> {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(SessionState::default())),
            logs: LogFeed::new(),
            gateway: SigningGateway::new(config),
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Discover the provider after the grace delay and attach to it.
    /// Returns the event stream to drive with [`run_events`](Self::run_events).
    pub async fn start<H>(&self, host: &H, locator: &ProviderLocator) -> Option<EventStream>
    where
        H: Host<Provider = P>,
    {
        if self.phase() == SessionPhase::ProviderUnavailable {
            warn!(reason = %SessionError::ProviderUnavailable, "session already settled, ignoring start");
            return None;
        }
        match locator.discover(host).await {
            Some(provider) => self.attach(provider),
            None => {
                self.mark_unavailable();
                None
            }
        }
    }

    /// Store the provider handle and subscribe to its events. Only the first
    /// call takes effect, so the session holds one subscription at most. A
    /// session already marked unavailable stays that way.
    pub fn attach(&self, provider: P) -> Option<EventStream> {
        {
            let state = self.state.borrow();
            if state.unavailable {
                warn!(reason = %SessionError::ProviderUnavailable, "session already settled, ignoring attach");
                return None;
            }
            if state.provider.is_some() {
                warn!("provider already attached, ignoring");
                return None;
            }
        }
        let provider = Rc::new(provider);
        let stream = provider.subscribe();
        self.state.borrow_mut().provider = Some(provider);
        match stream {
            Ok(stream) => {
                info!("provider attached");
                Some(stream)
            }
            Err(e) => {
                warn!(error = %e, "event subscription failed");
                self.logs.push(LogEntry::error(LogMethod::AccountChanged, format!("Failed to subscribe: {}", e.message())));
                None
            }
        }
    }

    /// Record that discovery found nothing. Terminal for this session.
    pub fn mark_unavailable(&self) {
        let mut state = self.state.borrow_mut();
        if state.provider.is_none() {
            state.unavailable = true;
        }
    }

    /// Apply events until the subscription ends. Handlers may overlap: an
    /// in-flight reconciliation does not hold back later events.
    pub async fn run_events(&self, stream: EventStream) {
        stream.for_each_concurrent(None, |event| self.handle_event(event)).await;
        debug!("event stream closed");
    }

    // -------------------------------------------------------------------------
    // Intents
    // -------------------------------------------------------------------------

    /// Request account access. Exactly one account connects; anything else logs an error.
    pub async fn connect(&self) {
        let Some(provider) = self.provider_for("connect") else { return };
        match provider.request_accounts().await.map_err(rejected).and_then(single_account) {
            Ok(account) => {
                info!(address = %account.address, "connected");
                let message = format!("connected to account: {}", account.to_json());
                self.set_account(account);
                self.logs.push(LogEntry::success(LogMethod::RequestAccounts, message));
            }
            Err(e) => {
                warn!(error = %e, "connect failed");
                self.logs.push(LogEntry::error(LogMethod::RequestAccounts, e.message()));
            }
        }
    }

    /// Silently pick up an account the wallet already granted, without prompting
    pub async fn restore(&self) {
        let Some(provider) = self.provider_for("restore") else { return };
        match provider.get_accounts().await {
            Ok(accounts) if accounts.is_empty() => debug!("no previously granted account"),
            Ok(accounts) => match single_account(accounts) {
                Ok(account) => {
                    let message = format!("restored account: {}", account.to_json());
                    self.set_account(account);
                    self.logs.push(LogEntry::success(LogMethod::GetAccounts, message));
                }
                Err(e) => self.logs.push(LogEntry::error(LogMethod::GetAccounts, e.message())),
            },
            Err(e) => self.logs.push(LogEntry::error(LogMethod::GetAccounts, e.message())),
        }
    }

    /// Ask the provider to sign the fixed PSBT. Outcome goes to the log only.
    pub async fn sign_transaction(&self) {
        let Some(provider) = self.provider_for("signTransaction") else { return };
        match self.gateway.sign(provider.as_ref()).await {
            Ok(signed) => {
                info!("psbt signed");
                self.logs.push(LogEntry::success(LogMethod::SignPsbt, format!("Signed PSBT: {}", signed)));
            }
            Err(e) => {
                warn!(error = %e, "signPSBT failed");
                self.logs.push(LogEntry::error(LogMethod::SignPsbt, e.message()));
            }
        }
    }

    /// Run a connected method's action
    pub async fn invoke(&self, method: ConnectedMethod) {
        match method {
            ConnectedMethod::SignTransaction => self.sign_transaction().await,
        }
    }

    pub fn clear_logs(&self) {
        self.logs.clear();
    }

    // -------------------------------------------------------------------------
    // Provider events
    // -------------------------------------------------------------------------

    pub async fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) if accounts.len() == 1 => {
                let Some(account) = accounts.into_iter().next() else { return };
                info!(address = %account.address, "account switched");
                let message = format!("Switched to account: {}", account.to_json());
                self.set_account(account);
                self.logs.push(LogEntry::info(LogMethod::AccountChanged, message));
            }
            ProviderEvent::AccountsChanged(accounts) => {
                let reason = SessionError::AmbiguousAccountChange(accounts.len());
                debug!(%reason, "reconciling");
                self.reconcile().await;
            }
            ProviderEvent::ChainChanged(chain) => {
                info!(%chain, "chain switched");
                self.logs.push(LogEntry::info(LogMethod::ChainChanged, format!("Switched network: {}", chain)));
            }
        }
    }

    /// Re-request accounts after an ambiguous change. Failure leaves the
    /// current account in place; it is not known to be invalid.
    async fn reconcile(&self) {
        let Some(provider) = self.provider() else { return };
        self.logs.push(LogEntry::info(LogMethod::AccountChanged, "Attempting to switch accounts."));
        match provider.request_accounts().await.map_err(rejected).and_then(single_account) {
            Ok(account) => {
                let message = format!("Re-connected to account: {}", account.to_json());
                self.set_account(account);
                self.logs.push(LogEntry::info(LogMethod::AccountChanged, message));
            }
            Err(e) => {
                warn!(error = %e, "re-connect failed");
                self.logs.push(LogEntry::error(LogMethod::AccountChanged, format!("Failed to re-connect: {}", e.message())));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    pub fn phase(&self) -> SessionPhase {
        let state = self.state.borrow();
        match (&state.provider, &state.account) {
            (Some(_), Some(_)) => SessionPhase::Connected,
            (Some(_), None) => SessionPhase::ProviderReady,
            (None, _) if state.unavailable => SessionPhase::ProviderUnavailable,
            (None, _) => SessionPhase::Uninitialized,
        }
    }

    pub fn account(&self) -> Option<Account> { self.state.borrow().account.clone() }
    pub fn has_provider(&self) -> bool { self.state.borrow().provider.is_some() }
    pub fn logs(&self) -> Vec<LogEntry> { self.logs.snapshot() }

    /// Receive every log entry appended from now on
    pub fn watch_logs(&self) -> mpsc::UnboundedReceiver<LogEntry> { self.logs.watch() }

    pub fn connected_methods(&self) -> Vec<ConnectedMethod> {
        if self.has_provider() { ConnectedMethod::ALL.to_vec() } else { Vec::new() }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase(),
            address: self.account().map(|a| a.address),
            connected_methods: self.connected_methods(),
            logs: self.logs(),
        }
    }

    fn provider(&self) -> Option<Rc<P>> { self.state.borrow().provider.clone() }

    /// Provider handle for a user intent; without one the intent is a no-op
    fn provider_for(&self, intent: &'static str) -> Option<Rc<P>> {
        let provider = self.provider();
        if provider.is_none() {
            warn!(intent, reason = %SessionError::ProviderUnavailable, "intent ignored");
        }
        provider
    }

    fn set_account(&self, account: Account) {
        self.state.borrow_mut().account = Some(account);
    }
}

fn rejected(e: SessionError) -> SessionError {
    match e {
        SessionError::Provider(m) => SessionError::ConnectionRejected(m),
        other => other,
    }
}

fn single_account(accounts: Vec<Account>) -> SessionResult<Account> {
    let count = accounts.len();
    let mut iter = accounts.into_iter();
    match (iter.next(), iter.next()) {
        (Some(account), None) => Ok(account),
        _ => Err(SessionError::ConnectionRejected(format!("Expected exactly one account, provider returned {}", count))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_feed_notifies_watchers() {
        let feed = LogFeed::new();
        let mut rx = feed.watch();
        feed.push(LogEntry::info(LogMethod::ChainChanged, "one"));
        let got = rx.try_next().unwrap().unwrap();
        assert_eq!(got.message, "one");
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn log_feed_drops_closed_watchers() {
        let feed = LogFeed::new();
        drop(feed.watch());
        feed.push(LogEntry::info(LogMethod::ChainChanged, "x"));
        assert!(feed.watchers.borrow().is_empty());
    }

    #[test]
    fn clear_keeps_watchers() {
        let feed = LogFeed::new();
        let mut rx = feed.watch();
        feed.push(LogEntry::info(LogMethod::ChainChanged, "a"));
        feed.clear();
        assert!(feed.is_empty());
        feed.push(LogEntry::info(LogMethod::ChainChanged, "b"));
        assert_eq!(rx.try_next().unwrap().unwrap().message, "a");
        assert_eq!(rx.try_next().unwrap().unwrap().message, "b");
    }

    #[test]
    fn single_account_requires_exactly_one() {
        assert!(single_account(vec![]).is_err());
        assert!(single_account(vec![Account::new("a", "1"), Account::new("b", "2")]).is_err());
        assert_eq!(single_account(vec![Account::new("a", "1")]).unwrap().address, "a");
    }

    #[test]
    fn rejected_keeps_provider_message() {
        let e = rejected(SessionError::Provider("User rejected".into()));
        assert_eq!(e.message(), "User rejected");
    }
}
