//! Signing Gateway - hands a fixed PSBT to the provider for signing
//!
//! The provider decides everything about the signature. Rejections, malformed
//! payloads and provider faults all come back as `SessionError::Signing` with
//! the provider's message verbatim.

use tracing::debug;

use super::config::SessionConfig;
use super::error::{SessionError, SessionResult};
use super::paths::PSBT_MAGIC;
use super::provider::BitcoinProvider;
use super::types::SignPsbtOptions;

/// A validated signing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    psbt_hex: String,
    options: SignPsbtOptions,
}

impl SigningRequest {
    pub fn new(psbt_hex: impl Into<String>, auto_finalize: bool) -> SessionResult<Self> {
        let psbt_hex = psbt_hex.into();
        let bytes = hex::decode(&psbt_hex)
            .map_err(|e| SessionError::Signing(format!("PSBT is not valid hex: {}", e)))?;
        if !bytes.starts_with(PSBT_MAGIC) {
            return Err(SessionError::Signing("PSBT is missing magic bytes".into()));
        }
        #[cfg(feature = "bitcoin")]
        {
            bitcoin::psbt::Psbt::deserialize(&bytes)
                .map_err(|e| SessionError::Signing(format!("PSBT does not decode: {}", e)))?;
        }
        Ok(Self { psbt_hex, options: SignPsbtOptions { auto_finalize } })
    }

    pub fn psbt_hex(&self) -> &str { &self.psbt_hex }
    pub fn options(&self) -> SignPsbtOptions { self.options }
}

#[derive(Debug, Clone)]
pub struct SigningGateway {
    psbt_hex: String,
    auto_finalize: bool,
}

impl SigningGateway {
    pub fn new(config: &SessionConfig) -> Self {
        Self { psbt_hex: config.psbt_hex.clone(), auto_finalize: config.auto_finalize }
    }

    /// The request this gateway sends on every call
    pub fn request(&self) -> SessionResult<SigningRequest> {
        SigningRequest::new(self.psbt_hex.clone(), self.auto_finalize)
    }

    /// Sign the fixed request, returning the provider's signed PSBT hex
    pub async fn sign<P: BitcoinProvider + ?Sized>(&self, provider: &P) -> SessionResult<String> {
        let request = self.request()?;
        debug!(bytes = request.psbt_hex().len() / 2, auto_finalize = request.options().auto_finalize, "signPSBT");
        provider
            .sign_psbt(request.psbt_hex(), request.options())
            .await
            .map_err(|e| match e {
                SessionError::Signing(m) | SessionError::Provider(m) => SessionError::Signing(m),
                other => SessionError::Signing(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProvider;

    #[test]
    fn default_request_is_well_formed() {
        let request = SigningGateway::new(&SessionConfig::new()).request().unwrap();
        assert!(request.options().auto_finalize);
        assert!(request.psbt_hex().starts_with("70736274ff"));
    }

    #[test]
    fn rejects_non_hex_payload() {
        let err = SigningRequest::new("zz", true).unwrap_err();
        assert!(matches!(err, SessionError::Signing(m) if m.contains("hex")));
    }

    #[test]
    fn rejects_payload_without_magic() {
        let err = SigningRequest::new("deadbeef", true).unwrap_err();
        assert_eq!(err, SessionError::Signing("PSBT is missing magic bytes".into()));
    }

    #[tokio::test]
    async fn sign_passes_fixed_request() {
        let provider = MockProvider::new();
        provider.push_sign(Ok("signed-hex".into()));
        let gateway = SigningGateway::new(&SessionConfig::new().with_auto_finalize(false));

        let signed = gateway.sign(&provider).await.unwrap();
        assert_eq!(signed, "signed-hex");

        let calls = provider.sign_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.starts_with("70736274ff"));
        assert!(!calls[0].1.auto_finalize);
    }

    #[tokio::test]
    async fn provider_message_is_verbatim() {
        let provider = MockProvider::new();
        provider.push_sign(Err(SessionError::Provider("User rejected the request.".into())));
        let gateway = SigningGateway::new(&SessionConfig::new());

        let err = gateway.sign(&provider).await.unwrap_err();
        assert_eq!(err, SessionError::Signing("User rejected the request.".into()));
    }

    #[tokio::test]
    async fn invalid_payload_never_reaches_provider() {
        let provider = MockProvider::new();
        let gateway = SigningGateway::new(&SessionConfig::new().with_psbt_hex("00"));
        assert!(gateway.sign(&provider).await.is_err());
        assert!(provider.sign_calls().is_empty());
    }
}
