//! Scripted collaborators for driving a session without a browser
//!
//! `MockProvider` answers provider calls from queues and records what it was
//! asked. A queued reply can be held open with a oneshot so that several
//! operations are in flight at once. `MockHost` injects it at a property path
//! and records sleeps and opened pages.

use async_trait::async_trait;
use futures::channel::{mpsc, oneshot};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::core::error::{SessionError, SessionResult};
use crate::core::locator::Host;
use crate::core::paths;
use crate::core::provider::{BitcoinProvider, EventStream};
use crate::core::types::{Account, ProviderEvent, SignPsbtOptions};

/// Scripted answer to one provider call
enum Reply<T> {
    Ready(SessionResult<T>),
    /// Resolves when the test sends on the paired `oneshot::Sender`
    Held(oneshot::Receiver<SessionResult<T>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> SessionResult<T> {
        match self {
            Reply::Ready(result) => result,
            Reply::Held(rx) => rx
                .await
                .unwrap_or_else(|_| Err(SessionError::Provider("held reply was dropped".into()))),
        }
    }
}

fn hold<T>(queue: &mut VecDeque<Reply<T>>) -> oneshot::Sender<SessionResult<T>> {
    let (tx, rx) = oneshot::channel();
    queue.push_back(Reply::Held(rx));
    tx
}

#[derive(Default)]
struct MockState {
    request_accounts: VecDeque<Reply<Vec<Account>>>,
    get_accounts: VecDeque<Reply<Vec<Account>>>,
    sign: VecDeque<Reply<String>>,
    request_calls: usize,
    get_calls: usize,
    sign_calls: Vec<(String, SignPsbtOptions)>,
    subscribers: Vec<mpsc::UnboundedSender<ProviderEvent>>,
    subscribe_error: Option<String>,
}

/// In-memory provider. Clones share state, like handles to one injected object.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Rc<RefCell<MockState>>,
}

impl MockProvider {
    pub fn new() -> Self { Self::default() }

    pub fn push_request_accounts(&self, result: SessionResult<Vec<Account>>) {
        self.state.borrow_mut().request_accounts.push_back(Reply::Ready(result));
    }

    pub fn push_get_accounts(&self, result: SessionResult<Vec<Account>>) {
        self.state.borrow_mut().get_accounts.push_back(Reply::Ready(result));
    }

    pub fn push_sign(&self, result: SessionResult<String>) {
        self.state.borrow_mut().sign.push_back(Reply::Ready(result));
    }

    /// Queue a `requestAccounts` reply that stays pending until the returned
    /// sender fires. Dropping the sender resolves it as a provider error.
    pub fn hold_request_accounts(&self) -> oneshot::Sender<SessionResult<Vec<Account>>> {
        hold(&mut self.state.borrow_mut().request_accounts)
    }

    pub fn hold_get_accounts(&self) -> oneshot::Sender<SessionResult<Vec<Account>>> {
        hold(&mut self.state.borrow_mut().get_accounts)
    }

    pub fn hold_sign(&self) -> oneshot::Sender<SessionResult<String>> {
        hold(&mut self.state.borrow_mut().sign)
    }

    pub fn fail_subscribe(&self, message: impl Into<String>) {
        self.state.borrow_mut().subscribe_error = Some(message.into());
    }

    /// Deliver an event to every live subscription
    pub fn emit(&self, event: ProviderEvent) {
        self.state.borrow_mut().subscribers.retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }

    /// End every subscription stream
    pub fn close(&self) {
        self.state.borrow_mut().subscribers.clear();
    }

    pub fn request_calls(&self) -> usize { self.state.borrow().request_calls }
    pub fn get_calls(&self) -> usize { self.state.borrow().get_calls }
    pub fn sign_calls(&self) -> Vec<(String, SignPsbtOptions)> { self.state.borrow().sign_calls.clone() }
    pub fn subscriber_count(&self) -> usize { self.state.borrow().subscribers.len() }
}

#[async_trait(?Send)]
impl BitcoinProvider for MockProvider {
    async fn request_accounts(&self) -> SessionResult<Vec<Account>> {
        let reply = {
            let mut state = self.state.borrow_mut();
            state.request_calls += 1;
            state.request_accounts.pop_front()
        };
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(SessionError::Provider("no scripted requestAccounts response".into())),
        }
    }

    async fn get_accounts(&self) -> SessionResult<Vec<Account>> {
        let reply = {
            let mut state = self.state.borrow_mut();
            state.get_calls += 1;
            state.get_accounts.pop_front()
        };
        match reply {
            Some(reply) => reply.resolve().await,
            None => Ok(Vec::new()),
        }
    }

    async fn sign_psbt(&self, psbt_hex: &str, options: SignPsbtOptions) -> SessionResult<String> {
        let reply = {
            let mut state = self.state.borrow_mut();
            state.sign_calls.push((psbt_hex.to_string(), options));
            state.sign.pop_front()
        };
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(SessionError::Provider("no scripted signPSBT response".into())),
        }
    }

    fn subscribe(&self) -> SessionResult<EventStream> {
        let mut state = self.state.borrow_mut();
        if let Some(message) = &state.subscribe_error {
            return Err(SessionError::Provider(message.clone()));
        }
        let (tx, rx) = mpsc::unbounded();
        state.subscribers.push(tx);
        Ok(rx)
    }
}

/// Host with an optional provider injected at a property path
#[derive(Clone)]
pub struct MockHost {
    injected: Option<(Vec<String>, MockProvider)>,
    opened: Rc<RefCell<Vec<String>>>,
    sleeps: Rc<RefCell<Vec<Duration>>>,
}

impl MockHost {
    /// Host where nothing was injected
    pub fn empty() -> Self {
        Self { injected: None, opened: Rc::default(), sleeps: Rc::default() }
    }

    /// Host with the provider at `phantom.bitcoin`
    pub fn with_provider(provider: MockProvider) -> Self {
        Self::with_provider_at(paths::provider::NAMESPACE.iter().copied(), provider)
    }

    pub fn with_provider_at<'a>(path: impl IntoIterator<Item = &'a str>, provider: MockProvider) -> Self {
        let path = path.into_iter().map(String::from).collect();
        Self { injected: Some((path, provider)), ..Self::empty() }
    }

    pub fn opened_urls(&self) -> Vec<String> { self.opened.borrow().clone() }
    pub fn sleeps(&self) -> Vec<Duration> { self.sleeps.borrow().clone() }
}

#[async_trait(?Send)]
impl Host for MockHost {
    type Provider = MockProvider;

    fn find_provider(&self, path: &[String]) -> Option<MockProvider> {
        match &self.injected {
            Some((at, provider)) if at.as_slice() == path => Some(provider.clone()),
            _ => None,
        }
    }

    fn open_url(&self, url: &str, _target: &str) {
        self.opened.borrow_mut().push(url.to_string());
    }

    /// Records the duration and returns immediately
    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}
