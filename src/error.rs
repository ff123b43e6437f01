//! Error types for asset_readiness

use thiserror::Error;

/// Crate-level error for operations that do propagate failures
///
/// The preload path itself never returns these; it reports through
/// [`LoadStatus`](crate::LoadStatus) instead.
#[derive(Error, Debug)]
pub enum ReadinessError {
    #[error("Host error: {0}")]
    Host(#[from] crate::host::HostError),

    #[error("Cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),

    #[error("Contact error: {0}")]
    Contact(#[from] crate::contact::ContactError),

    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for fallible crate operations
pub type Result<T> = std::result::Result<T, ReadinessError>;
