//! Session Configuration - passed from higher layers

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::SessionResult;
use super::paths::{self, provider};

/// Session configuration. Higher layers construct this or load it from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Property path to the provider on the host's global object
    pub provider_path: Vec<String>,
    pub install_url: String,
    pub grace_period_ms: u64,
    pub psbt_hex: String,
    pub auto_finalize: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            provider_path: provider::NAMESPACE.iter().map(|s| s.to_string()).collect(),
            install_url: provider::INSTALL_URL.into(),
            grace_period_ms: paths::GRACE_PERIOD_MS,
            psbt_hex: paths::DEMO_PSBT_HEX.into(),
            auto_finalize: true,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self { Self::default() }
    pub fn with_provider_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provider_path = path.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_install_url(mut self, url: impl Into<String>) -> Self { self.install_url = url.into(); self }
    pub fn with_grace_period_ms(mut self, ms: u64) -> Self { self.grace_period_ms = ms; self }
    pub fn with_psbt_hex(mut self, hex: impl Into<String>) -> Self { self.psbt_hex = hex.into(); self }
    pub fn with_auto_finalize(mut self, auto_finalize: bool) -> Self { self.auto_finalize = auto_finalize; self }

    pub fn from_json(json: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SessionError;

    #[test]
    fn defaults_target_phantom_bitcoin() {
        let config = SessionConfig::new();
        assert_eq!(config.provider_path, vec!["phantom", "bitcoin"]);
        assert_eq!(config.install_url, "https://phantom.app/");
        assert_eq!(config.grace_period(), Duration::from_millis(100));
        assert!(config.auto_finalize);
        assert!(config.psbt_hex.starts_with("70736274ff"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(r#"{"grace_period_ms": 250, "auto_finalize": false}"#).unwrap();
        assert_eq!(config.grace_period_ms, 250);
        assert!(!config.auto_finalize);
        assert_eq!(config.install_url, "https://phantom.app/");
    }

    #[test]
    fn bad_json_is_config_error() {
        let err = SessionConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
    }

    #[test]
    fn builder_overrides() {
        let config = SessionConfig::new()
            .with_provider_path(["unisat"])
            .with_install_url("https://example.org/install")
            .with_grace_period_ms(0);
        assert_eq!(config.provider_path, vec!["unisat"]);
        assert_eq!(config.install_url, "https://example.org/install");
        assert_eq!(config.grace_period(), Duration::ZERO);
    }
}
