//! Session errors

use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No injected capability at the configured namespace
    #[error("provider unavailable")]
    ProviderUnavailable,
    #[error("{0}")]
    ConnectionRejected(String),
    /// accountsChanged carried this many accounts instead of one
    #[error("ambiguous account change: {0} accounts")]
    AmbiguousAccountChange(usize),
    #[error("{0}")]
    Signing(String),
    /// Raw provider failure, message verbatim
    #[error("{0}")]
    Provider(String),
    #[error("invalid config: {0}")]
    Config(String),
}

impl SessionError {
    /// Message text suitable for a log entry
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::Config(e.to_string())
    }
}
