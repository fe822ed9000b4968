//! Signing certificate store.
//!
//! Certificates are fetched once per URL and kept in memory. Public API has
//! no status code knowledge; all HTTP handling lives in http.rs.
//!
//! # Cache policy
//!
//! By default entries never expire and the cache is unbounded. The trust
//! check runs before any lookup, so keys are limited to certificate URLs on
//! trusted hosts. Set [`CachePolicy::ttl`] to pick up rotated certificates
//! without a restart.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use crate::error::FetchError;

mod http;

pub use http::{CertificateFetcher, HttpsFetcher};

/// PEM certificate bytes as served by SNS.
pub type CertificateBytes = Arc<[u8]>;

/// Bounds for the certificate cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// Maximum number of cached certificates (`None` = unbounded).
    pub max_entries: Option<u64>,

    /// How long a certificate stays cached (`None` = process lifetime).
    pub ttl: Option<Duration>,
}

/// Caching certificate store.
///
/// Concurrent first requests for the same URL share a single fetch. Failed
/// fetches are not cached.
#[derive(Clone)]
pub struct CertificateStore {
    cache: Cache<String, CertificateBytes>,
    fetcher: Arc<dyn CertificateFetcher>,
}

impl CertificateStore {
    pub fn new(fetcher: Arc<dyn CertificateFetcher>, policy: CachePolicy) -> Self {
        let mut builder = Cache::builder();
        if let Some(max_entries) = policy.max_entries {
            builder = builder.max_capacity(max_entries);
        }
        if let Some(ttl) = policy.ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
            fetcher,
        }
    }

    /// Get the certificate at `url`, fetching it on first use.
    pub async fn get_certificate(&self, url: &str) -> Result<CertificateBytes, Arc<FetchError>> {
        if let Some(cert) = self.cache.get(url).await {
            debug!(url = %url, "certificate cache hit");
            return Ok(cert);
        }

        debug!(url = %url, "certificate cache miss");
        let fetcher = Arc::clone(&self.fetcher);
        let owned_url = url.to_string();

        self.cache
            .try_get_with(url.to_string(), async move {
                fetcher.fetch(&owned_url).await.map(CertificateBytes::from)
            })
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "certificate fetch failed"))
    }

    /// Whether a certificate for `url` is currently cached.
    pub fn contains(&self, url: &str) -> bool {
        self.cache.contains_key(url)
    }

    /// Number of cached certificates (may lag behind recent inserts).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Drop one cached certificate.
    pub async fn invalidate(&self, url: &str) {
        self.cache.invalidate(url).await;
    }

    /// Drop every cached certificate.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl fmt::Debug for CertificateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateStore")
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}
