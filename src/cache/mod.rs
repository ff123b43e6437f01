//! Durable URL-keyed byte cache
//!
//! The cache is a hint store: a warm entry lets a later process skip the
//! network, but a missing or broken store never changes load results.
//! Writes are idempotent (same URL, same bytes), so concurrent duplicate
//! writes need no coordination.

pub mod memory;
pub mod metrics;
#[cfg(feature = "runtime-tokio")]
pub mod disk;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

use crate::host::{HostError, MediaHost};
use crate::registry::AssetDescriptor;

pub use memory::MemoryCacheStore;
pub use metrics::{PreloadMetrics, PreloadMetricsHandle};
#[cfg(feature = "runtime-tokio")]
pub use disk::DiskCacheStore;

/// Error type for durable cache operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache storage unavailable")]
    Unavailable,

    #[error("Cache write denied: {0}")]
    Denied(String),

    #[error("Cache IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::Denied(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Origin-scoped persistent store keyed by resource URL
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Stored bytes for `url`, or `None` on a miss
    async fn lookup(&self, url: &str) -> CacheResult<Option<Bytes>>;

    /// Store `bytes` under `url`, replacing any previous entry
    async fn store(&self, url: &str, bytes: Bytes) -> CacheResult<()>;

    /// Whether an entry exists for `url`
    async fn contains(&self, url: &str) -> CacheResult<bool> {
        Ok(self.lookup(url).await?.is_some())
    }
}

/// What happened when persisting one resource
///
/// Kept for diagnostics only; every variant is equally fine for readiness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The entry was already present, nothing was fetched
    AlreadyCached,
    /// Bytes were fetched and stored
    Stored,
    /// The store refused or failed
    CacheUnavailable(CacheError),
    /// The network fetch for the bytes failed
    FetchFailed(HostError),
}

impl PersistOutcome {
    /// Whether the bytes are known to be in the store afterwards
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::AlreadyCached | Self::Stored)
    }
}

/// Stable cache key for `url` within `namespace`
pub fn cache_key(namespace: &str, url: &str) -> String {
    let hash = xxh3_64(format!("{namespace}\u{0}{url}").as_bytes());
    format!("{hash:016x}")
}

/// Fetch and store every resource that is not cached yet
///
/// Unlike the coordinator this stops at the first failure, so a build step
/// can report it. Returns how many entries were written.
pub async fn warm(
    host: &dyn MediaHost,
    cache: &dyn CacheStore,
    resources: &[AssetDescriptor],
) -> crate::Result<usize> {
    let mut stored = 0;
    for descriptor in resources {
        let url = descriptor.url();
        if cache.contains(url).await? {
            continue;
        }
        let bytes = host.fetch_bytes(url).await?;
        cache.store(url, bytes).await?;
        stored += 1;
    }
    log::info!("Warmed cache with {stored} of {} resources", resources.len());
    Ok(stored)
}
