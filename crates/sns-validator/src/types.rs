//! Validator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::canonicalize::TextEncoding;
use crate::cert::CachePolicy;
use crate::error::ConfigError;
use crate::trust::DEFAULT_HOST_PATTERN;

/// Validator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Regex the signing certificate host must match.
    #[serde(default = "default_host_pattern")]
    pub host_pattern: String,

    /// Encoding of signed field values.
    #[serde(default)]
    pub encoding: TextEncoding,

    /// Certificate fetch timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Largest certificate body accepted, in bytes.
    #[serde(default = "default_max_certificate_bytes")]
    pub max_certificate_bytes: u64,

    /// Certificate cache TTL in milliseconds (none = never expire).
    #[serde(default)]
    pub cache_ttl_ms: Option<u64>,

    /// Maximum cached certificates (none = unbounded).
    #[serde(default)]
    pub cache_max_entries: Option<u64>,
}

fn default_host_pattern() -> String {
    DEFAULT_HOST_PATTERN.to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_certificate_bytes() -> u64 {
    64 * 1024
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            host_pattern: default_host_pattern(),
            encoding: TextEncoding::default(),
            timeout_secs: default_timeout(),
            max_certificate_bytes: default_max_certificate_bytes(),
            cache_ttl_ms: None,
            cache_max_entries: None,
        }
    }
}

impl ValidatorConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `SNS_VALIDATOR_HOST_PATTERN` | Trusted certificate host regex |
    /// | `SNS_VALIDATOR_ENCODING` | Text encoding of signed values |
    /// | `SNS_VALIDATOR_TIMEOUT` | Fetch timeout in seconds |
    /// | `SNS_VALIDATOR_MAX_CERT_BYTES` | Certificate size limit |
    /// | `SNS_VALIDATOR_CACHE_TTL` | Certificate cache TTL in seconds |
    /// | `SNS_VALIDATOR_CACHE_MAX_ENTRIES` | Certificate cache capacity |
    ///
    /// Unparseable values fall back to the defaults with a warning. The host
    /// pattern is only checked when the validator is built. Use
    /// [`ValidatorConfig::try_from_env`] to reject an unknown encoding instead.
    pub fn from_env() -> Self {
        let encoding = env_parse::<TextEncoding>("SNS_VALIDATOR_ENCODING").unwrap_or_default();
        Self::from_env_with_encoding(encoding)
    }

    /// Like [`ValidatorConfig::from_env`], but an unknown
    /// `SNS_VALIDATOR_ENCODING` is an error.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let encoding = match env_value("SNS_VALIDATOR_ENCODING") {
            Some(value) => value.parse()?,
            None => TextEncoding::default(),
        };
        Ok(Self::from_env_with_encoding(encoding))
    }

    fn from_env_with_encoding(encoding: TextEncoding) -> Self {
        Self {
            host_pattern: env_value("SNS_VALIDATOR_HOST_PATTERN")
                .unwrap_or_else(default_host_pattern),
            encoding,
            timeout_secs: env_parse("SNS_VALIDATOR_TIMEOUT").unwrap_or_else(default_timeout),
            max_certificate_bytes: env_parse("SNS_VALIDATOR_MAX_CERT_BYTES")
                .unwrap_or_else(default_max_certificate_bytes),
            cache_ttl_ms: env_parse::<u64>("SNS_VALIDATOR_CACHE_TTL")
                .map(|secs| secs.saturating_mul(1000)),
            cache_max_entries: env_parse("SNS_VALIDATOR_CACHE_MAX_ENTRIES"),
        }
    }

    /// Set the trusted host pattern.
    pub fn with_host_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.host_pattern = pattern.into();
        self
    }

    /// Set the text encoding.
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the fetch timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Expire cached certificates after `ttl` (millisecond precision).
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_ms = Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Cap the number of cached certificates.
    pub fn with_cache_max_entries(mut self, max_entries: u64) -> Self {
        self.cache_max_entries = Some(max_entries);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Cache bounds for the certificate store.
    ///
    /// A zero TTL would expire every entry on insert, so it is ignored.
    pub fn cache_policy(&self) -> CachePolicy {
        let ttl = match self.cache_ttl_ms {
            Some(0) => {
                warn!("certificate cache TTL of zero ignored; entries will not expire");
                None
            }
            other => other.map(Duration::from_millis),
        };

        CachePolicy {
            max_entries: self.cache_max_entries,
            ttl,
        }
    }
}

/// Non-empty value of an environment variable.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Parse an environment variable, warning when it is set but unparseable.
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = env_value(name)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(var = name, value = %value, "ignoring unparseable environment variable");
            None
        }
    }
}
