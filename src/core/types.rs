//! Session data model: accounts, log entries, provider events

use serde::{Deserialize, Serialize};

/// The wallet's currently exposed identity. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub address: String,
    pub public_key: String,
}

impl Account {
    pub fn new(address: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self { address: address.into(), public_key: public_key.into() }
    }

    /// JSON form used in log messages
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.address.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Warning,
    Error,
    Info,
}

/// Operation that produced a log entry. The serialized names are the tags
/// the presentation layer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogMethod {
    #[serde(rename = "btc_requestAccounts")]
    RequestAccounts,
    #[serde(rename = "btc_getAccounts")]
    GetAccounts,
    #[serde(rename = "btc_signPSBT")]
    SignPsbt,
    #[serde(rename = "accountChanged")]
    AccountChanged,
    #[serde(rename = "chainChanged")]
    ChainChanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub status: LogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<LogMethod>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_two: Option<String>,
}

impl LogEntry {
    pub fn new(status: LogStatus, method: Option<LogMethod>, message: impl Into<String>) -> Self {
        Self { status, method, message: message.into(), message_two: None }
    }

    pub fn success(method: LogMethod, message: impl Into<String>) -> Self {
        Self::new(LogStatus::Success, Some(method), message)
    }

    pub fn info(method: LogMethod, message: impl Into<String>) -> Self {
        Self::new(LogStatus::Info, Some(method), message)
    }

    pub fn error(method: LogMethod, message: impl Into<String>) -> Self {
        Self::new(LogStatus::Error, Some(method), message)
    }
}

/// Events the provider publishes. Closed set: nothing else is subscribed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Emitted on connect, account switch and disconnect. Empty means disconnected.
    AccountsChanged(Vec<Account>),
    /// Emitted when switching between bitcoin mainnet and testnets
    ChainChanged(String),
}

/// Options passed alongside a PSBT to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignPsbtOptions {
    pub auto_finalize: bool,
}

impl Default for SignPsbtOptions {
    fn default() -> Self { Self { auto_finalize: true } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Uninitialized,
    ProviderUnavailable,
    ProviderReady,
    Connected,
}

impl SessionPhase {
    /// Whether the presentation layer should render the no-provider fallback
    pub fn shows_fallback(&self) -> bool {
        matches!(self, SessionPhase::ProviderUnavailable)
    }
}

/// User-invocable operations offered once a provider exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectedMethod {
    #[serde(rename = "Sign Transaction")]
    SignTransaction,
}

impl ConnectedMethod {
    pub const ALL: &'static [ConnectedMethod] = &[ConnectedMethod::SignTransaction];

    pub fn name(&self) -> &'static str {
        match self {
            ConnectedMethod::SignTransaction => "Sign Transaction",
        }
    }
}

/// Read-only snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: SessionPhase,
    pub address: Option<String>,
    pub connected_methods: Vec<ConnectedMethod>,
    pub logs: Vec<LogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn account_serializes_camel_case() {
        let account = Account::new("bc1qxyz", "02ab");
        assert_eq!(account.to_json(), r#"{"address":"bc1qxyz","publicKey":"02ab"}"#);
    }

    #[test]
    fn log_entry_uses_provider_tags() {
        let mut entry = LogEntry::error(LogMethod::SignPsbt, "nope");
        entry.message_two = Some("detail".into());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, json!({
            "status": "error",
            "method": "btc_signPSBT",
            "message": "nope",
            "messageTwo": "detail",
        }));
        let tag = serde_json::to_value(LogMethod::AccountChanged).unwrap();
        assert_eq!(tag, json!("accountChanged"));
    }

    #[test]
    fn log_entry_omits_absent_fields() {
        let entry = LogEntry::new(LogStatus::Info, None, "hello");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, json!({"status": "info", "message": "hello"}));
    }

    #[test]
    fn only_unavailable_shows_fallback() {
        assert!(SessionPhase::ProviderUnavailable.shows_fallback());
        assert!(!SessionPhase::Uninitialized.shows_fallback());
        assert!(!SessionPhase::ProviderReady.shows_fallback());
        assert!(!SessionPhase::Connected.shows_fallback());
    }

    #[test]
    fn connected_methods_are_static() {
        assert_eq!(ConnectedMethod::ALL.len(), 1);
        assert_eq!(ConnectedMethod::SignTransaction.name(), "Sign Transaction");
    }
}
