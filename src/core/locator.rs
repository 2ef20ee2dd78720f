//! Provider Locator - find the injected capability on the host
//!
//! One lookup after a single grace delay. Late injection by the host is
//! tolerated by waiting, not by polling.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::config::SessionConfig;
use super::provider::BitcoinProvider;
use super::paths::provider;

/// Host environment the provider is injected into (a browser window, or a mock)
#[async_trait(?Send)]
pub trait Host {
    type Provider: BitcoinProvider;

    /// Resolve the provider at a property path on the global object
    fn find_provider(&self, path: &[String]) -> Option<Self::Provider>;

    /// Direct the browsing context to a page (new tab)
    fn open_url(&self, url: &str, target: &str);

    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone)]
pub struct ProviderLocator {
    path: Vec<String>,
    install_url: String,
    grace_period: Duration,
}

impl ProviderLocator {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            path: config.provider_path.clone(),
            install_url: config.install_url.clone(),
            grace_period: config.grace_period(),
        }
    }

    /// Look up the provider now. When absent, sends the user to the install page.
    pub fn locate<H: Host>(&self, host: &H) -> Option<H::Provider> {
        match host.find_provider(&self.path) {
            Some(p) => {
                info!(path = %self.path.join("."), "provider found");
                Some(p)
            }
            None => {
                warn!(path = %self.path.join("."), url = %self.install_url, "provider missing, opening install page");
                host.open_url(&self.install_url, provider::INSTALL_TARGET);
                None
            }
        }
    }

    /// Wait out the grace period once, then locate
    pub async fn discover<H: Host>(&self, host: &H) -> Option<H::Provider> {
        debug!(ms = self.grace_period.as_millis() as u64, "waiting for provider injection");
        host.sleep(self.grace_period).await;
        self.locate(host)
    }

    pub fn grace_period(&self) -> Duration { self.grace_period }
}
