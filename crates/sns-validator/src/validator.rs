//! The validation pipeline.

use std::sync::Arc;

use tracing::debug;

use crate::canonicalize::TextEncoding;
use crate::cert::{CertificateFetcher, CertificateStore, HttpsFetcher};
use crate::error::{ConfigError, ValidationResult};
use crate::message::{Field, Message};
use crate::structure;
use crate::trust::TrustPattern;
use crate::types::ValidatorConfig;
use crate::verify::verify_signature;

/// Validator for inbound HTTP(S) SNS messages.
///
/// Cheap to clone; clones share the certificate cache.
#[derive(Debug, Clone)]
pub struct MessageValidator {
    trust: TrustPattern,
    encoding: TextEncoding,
    certificates: CertificateStore,
}

impl MessageValidator {
    /// Build a validator that fetches certificates over HTTPS.
    pub fn new(config: ValidatorConfig) -> Result<Self, ConfigError> {
        let fetcher = HttpsFetcher::new(config.timeout(), config.max_certificate_bytes)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Build a validator with a custom certificate fetcher.
    pub fn with_fetcher(
        config: ValidatorConfig,
        fetcher: Arc<dyn CertificateFetcher>,
    ) -> Result<Self, ConfigError> {
        let trust = TrustPattern::new(&config.host_pattern)?;

        Ok(Self {
            trust,
            encoding: config.encoding,
            certificates: CertificateStore::new(fetcher, config.cache_policy()),
        })
    }

    /// Build from `SNS_VALIDATOR_*` variables; an unknown encoding is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ValidatorConfig::try_from_env()?)
    }

    pub fn trust_pattern(&self) -> &TrustPattern {
        &self.trust
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn certificates(&self) -> &CertificateStore {
        &self.certificates
    }

    /// Validate a message and return it normalized.
    ///
    /// # Pipeline
    ///
    /// 1. Resolve Lambda key aliases
    /// 2. Check required keys for the message type
    /// 3. Check the certificate URL against the trust pattern
    /// 4. Verify the signature (may fetch the certificate)
    ///
    /// Each step short-circuits; the certificate is never fetched for a
    /// message that fails steps 2 or 3.
    pub async fn validate(&self, message: Message) -> ValidationResult<Message> {
        // 1. Normalize
        let message = message.normalized();

        // 2. Structure
        let message_type = structure::check(&message)?;

        // 3. Trust domain
        let cert_url = message.get(Field::SigningCertUrl).unwrap_or_default();
        self.trust.check_url(cert_url)?;

        // 4. Signature
        verify_signature(&message, message_type, self.encoding, &self.certificates).await?;

        debug!(
            message_id = message.get(Field::MessageId).unwrap_or_default(),
            message_type = %message_type,
            "message validated"
        );
        Ok(message)
    }

    /// Validate a JSON-encoded message.
    pub async fn validate_json(&self, json: &str) -> ValidationResult<Message> {
        self.validate(Message::from_json_str(json)?).await
    }

    /// Validate an already-parsed JSON message.
    pub async fn validate_value(&self, value: serde_json::Value) -> ValidationResult<Message> {
        self.validate(Message::from_value(value)?).await
    }
}
