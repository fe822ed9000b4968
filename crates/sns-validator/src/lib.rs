//! Validation of inbound Amazon SNS HTTP(S) messages.
//!
//! This crate rejects forged or tampered SNS notifications before a webhook
//! endpoint acts on them:
//!
//! - Structural checks (required keys per message type)
//! - Trust-domain check of the signing certificate URL
//! - Signature version 1 verification (RSA-SHA1 over the canonical string)
//! - In-memory certificate cache shared across validations
//!
//! # Quick Start
//!
//! ```no_run
//! use sns_validator::{MessageValidator, ValidatorConfig};
//!
//! # async fn example(body: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let validator = MessageValidator::new(ValidatorConfig::default())?;
//!
//! let message = validator.validate_json(body).await?;
//! println!("accepted {:?}", message.message_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `SNS_VALIDATOR_HOST_PATTERN` | Trusted host regex (default: `sns.<region>.amazonaws.com[.cn]`) |
//! | `SNS_VALIDATOR_ENCODING` | Encoding of signed values (default: `utf8`) |
//! | `SNS_VALIDATOR_TIMEOUT` | Certificate fetch timeout in seconds (default: 10) |
//! | `SNS_VALIDATOR_MAX_CERT_BYTES` | Certificate size limit (default: 65536) |
//! | `SNS_VALIDATOR_CACHE_TTL` | Certificate cache TTL in seconds (default: none) |
//! | `SNS_VALIDATOR_CACHE_MAX_ENTRIES` | Certificate cache capacity (default: unbounded) |

pub mod canonicalize;
pub mod cert;
pub mod error;
pub mod message;
pub mod structure;
pub mod trust;
pub mod types;
pub mod validator;
pub mod verify;

// Re-export main types
pub use canonicalize::{canonical_bytes, canonical_string, TextEncoding};
pub use cert::{CachePolicy, CertificateBytes, CertificateFetcher, CertificateStore, HttpsFetcher};
pub use error::{
    ConfigError, ErrorKind, FetchError, SignatureFailure, ValidationError, ValidationResult,
};
pub use message::{Field, Message, MessageType};
pub use trust::{TrustPattern, DEFAULT_HOST_PATTERN};
pub use types::ValidatorConfig;
pub use validator::MessageValidator;
pub use verify::{verify_signature, verify_with_certificate, SUPPORTED_SIGNATURE_VERSION};
