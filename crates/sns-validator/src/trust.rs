//! Trust-domain check for signing certificate URLs.
//!
//! A certificate URL is trusted when all of the following hold:
//! - the scheme is `https`
//! - the path (query included) ends in `.pem`
//! - the host matches the configured [`TrustPattern`]
//!
//! This runs before any network access, so an attacker-supplied URL is never
//! fetched.

use regex::Regex;
use url::Url;

use crate::error::{ConfigError, ValidationError, ValidationResult};

/// Hosts SNS serves signing certificates from, including China regions.
pub const DEFAULT_HOST_PATTERN: &str = r"^sns\.[a-zA-Z0-9\-]{3,}\.amazonaws\.com(\.cn)?$";

/// Compiled host-matching rule.
#[derive(Debug, Clone)]
pub struct TrustPattern {
    regex: Regex,
}

impl TrustPattern {
    /// Compile a host pattern.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidHostPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether a host (with optional `:port`) matches.
    pub fn matches_host(&self, host: &str) -> bool {
        self.regex.is_match(host)
    }

    /// Whether a certificate URL passes the scheme, extension and host checks.
    pub fn is_trusted_url(&self, cert_url: &str) -> bool {
        let Ok(parsed) = Url::parse(cert_url) else {
            return false;
        };

        if parsed.scheme() != "https" {
            return false;
        }

        let mut path = parsed.path().to_string();
        if let Some(query) = parsed.query() {
            path.push('?');
            path.push_str(query);
        }
        if !path.ends_with(".pem") {
            return false;
        }

        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        self.matches_host(&host)
    }

    /// Check a certificate URL, failing with `UntrustedCertificateSource`.
    pub fn check_url(&self, cert_url: &str) -> ValidationResult<()> {
        if self.is_trusted_url(cert_url) {
            Ok(())
        } else {
            Err(ValidationError::UntrustedCertificateSource {
                url: cert_url.to_string(),
            })
        }
    }
}

impl Default for TrustPattern {
    fn default() -> Self {
        // The built-in pattern is a compile-time constant known to be valid.
        Self {
            regex: Regex::new(DEFAULT_HOST_PATTERN).expect("default host pattern compiles"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accepts_regional_hosts() {
        let trust = TrustPattern::default();
        for url in [
            "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-abc.pem",
            "https://sns.eu-central-1.amazonaws.com/cert.pem",
            "https://sns.cn-north-1.amazonaws.com.cn/cert.pem",
            "https://sns.us-gov-west-1.amazonaws.com/a/b/cert.pem",
        ] {
            assert!(trust.is_trusted_url(url), "{url}");
        }
    }

    #[test]
    fn test_rejects_non_https() {
        let trust = TrustPattern::default();
        assert!(!trust.is_trusted_url("http://sns.us-east-1.amazonaws.com/cert.pem"));
        assert!(!trust.is_trusted_url("ftp://sns.us-east-1.amazonaws.com/cert.pem"));
    }

    #[test]
    fn test_rejects_non_pem_path() {
        let trust = TrustPattern::default();
        assert!(!trust.is_trusted_url("https://sns.us-east-1.amazonaws.com/cert.crt"));
        assert!(!trust.is_trusted_url("https://sns.us-east-1.amazonaws.com/cert.pem?x=1"));
        assert!(!trust.is_trusted_url("https://sns.us-east-1.amazonaws.com/"));
    }

    #[test]
    fn test_rejects_foreign_hosts() {
        let trust = TrustPattern::default();
        for url in [
            "https://evil.com/cert.pem",
            "https://sns.us-east-1.amazonaws.com.evil.com/cert.pem",
            "https://sns.us.amazonaws.com/cert.pem",
            "https://sns.a_b_c.amazonaws.com/cert.pem",
            "https://xsns.us-east-1.amazonaws.com/cert.pem",
            "https://sns.us-east-1.amazonaws.com:8443/cert.pem",
        ] {
            assert!(!trust.is_trusted_url(url), "{url}");
        }
    }

    #[test]
    fn test_rejects_unparseable_urls() {
        let trust = TrustPattern::default();
        assert!(!trust.is_trusted_url(""));
        assert!(!trust.is_trusted_url("not a url"));
        assert!(!trust.is_trusted_url("/cert.pem"));
    }

    #[test]
    fn test_custom_pattern_with_port() {
        let trust = TrustPattern::new(r"^localhost:\d+$").unwrap();
        assert!(trust.is_trusted_url("https://localhost:56789/cert.pem"));
        assert!(!trust.is_trusted_url("https://localhost/cert.pem"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = TrustPattern::new("(unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHostPattern { .. }));
    }

    #[test]
    fn test_check_url_error_kind() {
        let err = TrustPattern::default()
            .check_url("https://evil.com/cert.pem")
            .unwrap_err();
        match err {
            ValidationError::UntrustedCertificateSource { url } => {
                assert_eq!(url, "https://evil.com/cert.pem")
            }
            other => panic!("expected UntrustedCertificateSource, got {other:?}"),
        }
    }
}
