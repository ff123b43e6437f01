//! Host abstraction for browser media primitives
//!
//! The coordinator never talks to a browser directly. It asks a
//! [`MediaHost`] for the viewport, for media elements and for raw bytes,
//! so the same pipeline runs against a browser binding, a local document
//! root, or a scripted mock.

pub mod headless;
pub mod mock;
#[cfg(feature = "runtime-tokio")]
pub mod fs;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::registry::AssetKind;

/// Error type for host operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Media API unavailable in this context")]
    Unsupported,

    #[error("Network error for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Media decode error: {0}")]
    Decode(String),

    #[error("Playback denied: {0}")]
    PlaybackDenied(String),
}

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

/// Where a media element should take its bytes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Load from the network at the element's URL
    Network,
    /// Load from bytes already held in the durable cache
    Cached(Bytes),
}

/// A media or image object driving the host's native loader
#[async_trait]
pub trait MediaElement: Send + Sync {
    /// Kind of media this element renders
    fn kind(&self) -> AssetKind;

    /// Resource URL assigned to the element
    fn url(&self) -> &str;

    /// Begin loading and resolve once initial data is available
    async fn load(&self, source: MediaSource) -> HostResult<()>;

    /// Start muted playback
    ///
    /// Hosts with autoplay restrictions may return [`HostError::PlaybackDenied`].
    async fn play_muted(&self) -> HostResult<()>;

    /// Pause playback; a no-op when not playing
    fn pause(&self);

    /// Whether the element is currently playing
    fn is_playing(&self) -> bool;
}

/// Access to the environment's media and network primitives
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Viewport width in CSS pixels, or `None` outside a browser
    fn viewport_width(&self) -> Option<u32>;

    /// Create an element for `url`
    fn create_element(&self, kind: AssetKind, url: &str) -> HostResult<Arc<dyn MediaElement>>;

    /// Fetch the raw bytes of `url` over the network
    async fn fetch_bytes(&self, url: &str) -> HostResult<Bytes>;

    /// Name of this host (for debugging)
    fn name(&self) -> &'static str;
}

/// Read-only view of an element owned by the coordinator
///
/// Consumers can inspect the element but cannot load, play or pause it.
#[derive(Clone)]
pub struct ElementView {
    inner: Arc<dyn MediaElement>,
}

impl ElementView {
    pub(crate) fn new(inner: Arc<dyn MediaElement>) -> Self {
        Self { inner }
    }

    /// Kind of media
    pub fn kind(&self) -> AssetKind {
        self.inner.kind()
    }

    /// Resource URL
    pub fn url(&self) -> &str {
        self.inner.url()
    }

    /// Whether the element is currently playing
    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }
}

impl fmt::Debug for ElementView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementView")
            .field("kind", &self.kind())
            .field("url", &self.url())
            .field("playing", &self.is_playing())
            .finish()
    }
}
