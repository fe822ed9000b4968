//! Error types for message validation.

use std::sync::Arc;

/// Failure classification for a rejected message.
///
/// Every failed validation maps to exactly one kind. None of them are retried
/// by the validator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    StructureInvalid,
    UntrustedCertificateSource,
    UnsupportedSignatureVersion,
    CertificateUnavailable,
    InvalidSignature,
}

/// Validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Message is missing required keys for its type, or could not be decoded.
    #[error("message structure invalid: {reason}")]
    StructureInvalid { reason: String },

    /// Signing certificate URL failed the scheme, extension or host check.
    #[error("the certificate is located on an untrusted domain: {url}")]
    UntrustedCertificateSource { url: String },

    /// `SignatureVersion` is not one we can verify.
    #[error("the signature version {version} is not supported")]
    UnsupportedSignatureVersion { version: String },

    /// Certificate could not be retrieved.
    #[error("certificate could not be retrieved from {url}")]
    CertificateUnavailable {
        url: String,
        #[source]
        source: Arc<FetchError>,
    },

    /// Signature did not verify. The cause is kept for logging only.
    #[error("the message signature is invalid")]
    InvalidSignature {
        #[source]
        source: SignatureFailure,
    },
}

impl ValidationError {
    pub(crate) fn structure(reason: impl Into<String>) -> Self {
        Self::StructureInvalid {
            reason: reason.into(),
        }
    }

    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StructureInvalid { .. } => ErrorKind::StructureInvalid,
            Self::UntrustedCertificateSource { .. } => ErrorKind::UntrustedCertificateSource,
            Self::UnsupportedSignatureVersion { .. } => ErrorKind::UnsupportedSignatureVersion,
            Self::CertificateUnavailable { .. } => ErrorKind::CertificateUnavailable,
            Self::InvalidSignature { .. } => ErrorKind::InvalidSignature,
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::StructureInvalid { .. } => 1,
            Self::UntrustedCertificateSource { .. } => 2,
            Self::UnsupportedSignatureVersion { .. } => 3,

            // Security failure
            Self::InvalidSignature { .. } => 4,

            // Network/transient
            Self::CertificateUnavailable { .. } => 5,
        }
    }

    /// Whether a caller may reasonably retry the same message later.
    ///
    /// Only certificate retrieval can fail transiently; everything else is a
    /// property of the message itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CertificateUnavailable { .. })
    }
}

/// Why a signature could not be verified.
///
/// Not part of [`ValidationError`]'s display text.
#[derive(Debug, thiserror::Error)]
pub enum SignatureFailure {
    #[error("signature is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("certificate could not be parsed: {0}")]
    Certificate(String),

    #[error("certificate public key is not a usable RSA key: {0}")]
    PublicKey(String),

    #[error("rsa-sha1 verification failed: {0}")]
    Mismatch(#[from] rsa::signature::Error),
}

/// Certificate fetch errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Server answered outside the 2xx range.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// Connection, TLS or body read failure.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Certificate body exceeded the configured limit.
    #[error("certificate body exceeds {limit} bytes")]
    TooLarge { limit: u64 },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

/// Errors raised while building a validator from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid host pattern {pattern:?}: {source}")]
    InvalidHostPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unsupported text encoding: {0}")]
    InvalidEncoding(String),

    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_signature_hides_cause() {
        let err = ValidationError::InvalidSignature {
            source: SignatureFailure::Certificate("bad DER at offset 12".to_string()),
        };
        assert_eq!(err.to_string(), "the message signature is invalid");
        let source = std::error::Error::source(&err).expect("cause kept for logging");
        assert!(source.to_string().contains("offset 12"));
    }

    #[test]
    fn test_only_certificate_fetch_is_retryable() {
        let unavailable = ValidationError::CertificateUnavailable {
            url: "https://sns.us-east-1.amazonaws.com/a.pem".to_string(),
            source: Arc::new(FetchError::Status { status: 503 }),
        };
        assert!(unavailable.is_retryable());
        assert_eq!(unavailable.kind(), ErrorKind::CertificateUnavailable);

        let structure = ValidationError::structure("missing Token");
        assert!(!structure.is_retryable());
        assert_eq!(structure.exit_code(), 1);
    }
}
