//! Mock host for testing
//!
//! Loads complete immediately, failures are scripted per URL, and every
//! element load and network request is counted so tests can assert on
//! fetch behaviour without a browser.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{HostError, HostResult, MediaElement, MediaHost, MediaSource};
use crate::registry::AssetKind;

#[derive(Debug, Default)]
struct MockState {
    load_attempts: RwLock<HashMap<String, u32>>,
    network_requests: RwLock<HashMap<String, u32>>,
    initiation_log: RwLock<Vec<String>>,
    failing_loads: RwLock<HashSet<String>>,
    failing_fetches: RwLock<HashSet<String>>,
    deny_autoplay: AtomicBool,
    elements: RwLock<Vec<Arc<MockElement>>>,
}

impl MockState {
    fn count_network(&self, url: &str) {
        *self
            .network_requests
            .write()
            .entry(url.to_string())
            .or_insert(0) += 1;
    }
}

/// Mock media host
///
/// Clones share state, so a test can keep one clone for assertions and
/// hand another to the coordinator.
#[derive(Clone, Debug)]
pub struct MockHost {
    viewport: Option<u32>,
    state: Arc<MockState>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    /// Create a desktop-sized mock host (1280px viewport)
    pub fn new() -> Self {
        Self::with_viewport(1280)
    }

    /// Create a mock host with a specific viewport width
    pub fn with_viewport(width: u32) -> Self {
        Self {
            viewport: Some(width),
            state: Arc::new(MockState::default()),
        }
    }

    /// Make every network load of `url` fail
    pub fn fail_load(&self, url: &str) {
        self.state.failing_loads.write().insert(url.to_string());
    }

    /// Make every raw byte fetch of `url` fail
    pub fn fail_fetch(&self, url: &str) {
        self.state.failing_fetches.write().insert(url.to_string());
    }

    /// Refuse programmatic playback, like a strict autoplay policy
    pub fn deny_autoplay(&self) {
        self.state.deny_autoplay.store(true, Ordering::SeqCst);
    }

    /// Number of element loads started for `url`
    pub fn load_attempts(&self, url: &str) -> u32 {
        self.state
            .load_attempts
            .read()
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// Number of element loads started across all URLs
    pub fn total_load_attempts(&self) -> u32 {
        self.state.load_attempts.read().values().sum()
    }

    /// Number of requests that went to the network for `url`
    pub fn network_requests(&self, url: &str) -> u32 {
        self.state
            .network_requests
            .read()
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// Number of requests that went to the network across all URLs
    pub fn total_network_requests(&self) -> u32 {
        self.state.network_requests.read().values().sum()
    }

    /// URLs in the order their element loads started
    pub fn initiation_order(&self) -> Vec<String> {
        self.state.initiation_log.read().clone()
    }

    /// The most recently created element for `url`
    pub fn element(&self, url: &str) -> Option<Arc<MockElement>> {
        self.state
            .elements
            .read()
            .iter()
            .rev()
            .find(|element| element.url == url)
            .cloned()
    }

    /// Number of elements currently playing
    pub fn playing_count(&self) -> usize {
        self.state
            .elements
            .read()
            .iter()
            .filter(|element| element.is_playing())
            .count()
    }
}

#[async_trait]
impl MediaHost for MockHost {
    fn viewport_width(&self) -> Option<u32> {
        self.viewport
    }

    fn create_element(&self, kind: AssetKind, url: &str) -> HostResult<Arc<dyn MediaElement>> {
        let element = Arc::new(MockElement {
            kind,
            url: url.to_string(),
            playing: AtomicBool::new(false),
            play_calls: AtomicU32::new(0),
            source: RwLock::new(None),
            state: Arc::clone(&self.state),
        });
        self.state.elements.write().push(Arc::clone(&element));
        Ok(element)
    }

    async fn fetch_bytes(&self, url: &str) -> HostResult<Bytes> {
        self.state.count_network(url);
        if self.state.failing_fetches.read().contains(url) {
            return Err(HostError::Network {
                url: url.to_string(),
                reason: "mock fetch failure".into(),
            });
        }
        Ok(Bytes::from(format!("bytes:{url}")))
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}

/// Element created by [`MockHost`]
pub struct MockElement {
    kind: AssetKind,
    url: String,
    playing: AtomicBool,
    play_calls: AtomicU32,
    source: RwLock<Option<MediaSource>>,
    state: Arc<MockState>,
}

impl std::fmt::Debug for MockElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockElement")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("playing", &self.is_playing())
            .finish()
    }
}

impl MockElement {
    /// Source of the last load, if any
    pub fn loaded_from(&self) -> Option<MediaSource> {
        self.source.read().clone()
    }

    /// Number of times muted playback was requested
    pub fn play_calls(&self) -> u32 {
        self.play_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaElement for MockElement {
    fn kind(&self) -> AssetKind {
        self.kind
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn load(&self, source: MediaSource) -> HostResult<()> {
        *self
            .state
            .load_attempts
            .write()
            .entry(self.url.clone())
            .or_insert(0) += 1;
        self.state.initiation_log.write().push(self.url.clone());

        if source == MediaSource::Network {
            self.state.count_network(&self.url);
            if self.state.failing_loads.read().contains(&self.url) {
                return Err(HostError::Network {
                    url: self.url.clone(),
                    reason: "mock load failure".into(),
                });
            }
        }

        *self.source.write() = Some(source);
        Ok(())
    }

    async fn play_muted(&self) -> HostResult<()> {
        self.play_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.deny_autoplay.load(Ordering::SeqCst) {
            return Err(HostError::PlaybackDenied("autoplay blocked".into()));
        }
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}
