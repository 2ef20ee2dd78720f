//! Runtime - drive a session on a tokio `LocalSet`
//!
//! Provider handles are `!Send`, so everything here uses `spawn_local` and
//! must run inside a `tokio::task::LocalSet`.

use tokio::task::JoinHandle;

use crate::core::config::SessionConfig;
use crate::core::locator::{Host, ProviderLocator};
use crate::core::provider::{BitcoinProvider, EventStream};
use crate::core::session::SessionController;

/// Process provider events in the background until the stream ends
pub fn spawn_event_loop<P>(session: SessionController<P>, stream: EventStream) -> JoinHandle<()>
where
    P: BitcoinProvider + 'static,
{
    tokio::task::spawn_local(async move {
        session.run_events(stream).await;
    })
}

/// Discover the provider, attach, and start the event loop.
/// The handle is `None` when no provider was found or subscribing failed.
pub async fn start_session<H>(host: &H, config: &SessionConfig) -> (SessionController<H::Provider>, Option<JoinHandle<()>>)
where
    H: Host,
    H::Provider: 'static,
{
    let session = SessionController::new(config);
    let locator = ProviderLocator::new(config);
    let handle = session
        .start(host, &locator)
        .await
        .map(|stream| spawn_event_loop(session.clone(), stream));
    (session, handle)
}
