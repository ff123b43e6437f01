//! Preload coordinator
//!
//! A single long-lived instance is built at application bootstrap and
//! shared by reference with every consumer. It drives each registered
//! resource from `pending` to `ready` (or `failed`), persists fetched bytes
//! to the durable cache, and exposes read-only state snapshots plus a
//! change feed.
//!
//! Nothing here returns an error to the caller: load failures become
//! [`LoadStatus::Failed`], and autoplay or cache problems are logged and
//! otherwise ignored.

pub mod state;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::future::{self, Either};
use parking_lot::RwLock;

use crate::cache::{CacheStore, PersistOutcome, PreloadMetricsHandle};
use crate::config::PreloadConfig;
use crate::host::{MediaElement, MediaHost, MediaSource};
use crate::policy::{compute_policy, EnvironmentPolicy};
use crate::registry::{AssetDescriptor, AssetKind};
use crate::runtime::AsyncSpawner;

pub use state::{LoadEvent, LoadState, LoadStatus};
use state::LoadEntry;

/// State shared between the coordinator and its load tasks
struct Shared {
    host: Arc<dyn MediaHost>,
    cache: Arc<dyn CacheStore>,
    policy: EnvironmentPolicy,
    config: PreloadConfig,
    table: RwLock<HashMap<String, LoadEntry>>,
    /// Registration order of `table` keys
    order: RwLock<Vec<String>>,
    subscribers: RwLock<Vec<UnboundedSender<LoadEvent>>>,
    metrics: PreloadMetricsHandle,
}

/// Process-wide preload coordinator
pub struct PreloadCoordinator<S: AsyncSpawner> {
    shared: Arc<Shared>,
    spawner: S,
    started: AtomicBool,
}

impl<S: AsyncSpawner> PreloadCoordinator<S> {
    /// Create a coordinator, computing the environment policy from `host`
    pub fn new(
        host: Arc<dyn MediaHost>,
        cache: Arc<dyn CacheStore>,
        spawner: S,
        config: PreloadConfig,
    ) -> Self {
        let policy = compute_policy(host.as_ref(), &config);
        Self::with_policy(host, cache, spawner, config, policy)
    }

    /// Create a coordinator with an explicit policy
    pub fn with_policy(
        host: Arc<dyn MediaHost>,
        cache: Arc<dyn CacheStore>,
        spawner: S,
        config: PreloadConfig,
        policy: EnvironmentPolicy,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                host,
                cache,
                policy,
                config,
                table: RwLock::new(HashMap::new()),
                order: RwLock::new(Vec::new()),
                subscribers: RwLock::new(Vec::new()),
                metrics: PreloadMetricsHandle::new(),
            }),
            spawner,
            started: AtomicBool::new(false),
        }
    }

    /// The environment policy in effect
    pub fn policy(&self) -> &EnvironmentPolicy {
        &self.shared.policy
    }

    /// The configuration in effect
    pub fn config(&self) -> &PreloadConfig {
        &self.shared.config
    }

    /// Get a reference to the metrics handle
    pub fn metrics(&self) -> &PreloadMetricsHandle {
        &self.shared.metrics
    }

    /// Whether [`start`](Self::start) has run
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Register `resources` and begin loading them
    ///
    /// Only the first call does anything; later calls return `false`.
    /// Critical resources are initiated before secondary ones, each class in
    /// the given order. On constrained bandwidth secondary resources stay
    /// `pending` until [`request`](Self::request)ed. Outside a browser
    /// everything stays `pending`.
    pub fn start(&self, resources: &[AssetDescriptor]) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            log::debug!("Preload coordinator already started");
            return false;
        }

        let mut ordered = resources.to_vec();
        ordered.sort_by_key(|descriptor| descriptor.priority);
        self.shared.register(&ordered);

        let policy = self.shared.policy;
        if !policy.preload_enabled() {
            log::info!(
                "Preloading disabled on {} host, {} resources left pending",
                self.shared.host.name(),
                ordered.len()
            );
            return true;
        }

        log::info!(
            "Preloading {} resources on {} ({:?}, runtime {})",
            ordered.len(),
            self.shared.host.name(),
            policy.preferred_format,
            self.spawner.runtime_name()
        );
        for descriptor in &ordered {
            if policy.is_constrained_bandwidth && descriptor.is_deferrable() {
                log::debug!("Deferring {} on constrained bandwidth", descriptor.url());
                continue;
            }
            self.begin(descriptor.url());
        }
        true
    }

    /// Snapshot of `url`'s state, or `None` if it is not managed
    pub fn get_state(&self, url: &str) -> Option<LoadState> {
        self.shared.table.read().get(url).map(LoadEntry::snapshot)
    }

    /// Snapshots of every managed resource, critical first
    pub fn states(&self) -> Vec<LoadState> {
        let table = self.shared.table.read();
        self.shared
            .order
            .read()
            .iter()
            .filter_map(|url| table.get(url).map(LoadEntry::snapshot))
            .collect()
    }

    /// Whether `url` is ready to display
    pub fn is_ready(&self, url: &str) -> bool {
        self.get_state(url).is_some_and(|state| state.is_ready())
    }

    /// Load a deferred resource on first real use
    ///
    /// Only acts on a managed resource that is still `pending`; resources
    /// already fetching, buffering, ready or failed are left alone. Returns
    /// whether a load was issued.
    pub fn request(&self, url: &str) -> bool {
        if !self.shared.policy.preload_enabled() {
            return false;
        }
        self.begin(url)
    }

    /// Move a failed resource back to `pending` and load it again
    ///
    /// Failures are never retried automatically; this is the only way out
    /// of `failed` within a process.
    pub fn retry(&self, url: &str) -> bool {
        let event = {
            let mut table = self.shared.table.write();
            let Some(entry) = table.get_mut(url) else {
                return false;
            };
            if !entry.reset_failed() {
                return false;
            }
            entry.event()
        };
        log::info!("Retrying {url}");
        self.shared.emit(event);
        self.request(url)
    }

    /// Subscribe to state changes
    ///
    /// Every accepted transition and every change of the cache flag is
    /// sent; past events are not replayed.
    pub fn subscribe(&self) -> UnboundedReceiver<LoadEvent> {
        let (tx, rx) = unbounded();
        self.shared.subscribers.write().push(tx);
        rx
    }

    /// Pause every playing element the coordinator owns
    pub fn dispose(&self) {
        let table = self.shared.table.read();
        let mut paused = 0;
        for element in table.values().filter_map(|entry| entry.element.as_ref()) {
            if element.is_playing() {
                element.pause();
                paused += 1;
            }
        }
        log::debug!("Disposed preload coordinator, paused {paused} elements");
    }

    fn begin(&self, url: &str) -> bool {
        let (descriptor, element, event) = {
            let mut table = self.shared.table.write();
            let Some(entry) = table.get_mut(url) else {
                return false;
            };
            if entry.status != LoadStatus::Pending || entry.element.is_some() {
                return false;
            }

            match self.shared.host.create_element(entry.descriptor.kind, url) {
                Ok(element) => {
                    entry.element = Some(Arc::clone(&element));
                    entry.advance(LoadStatus::Fetching);
                    (entry.descriptor.clone(), element, entry.event())
                }
                Err(err) => {
                    log::warn!("Could not create element for {url}: {err}");
                    entry.advance(LoadStatus::Failed(err.to_string()));
                    let event = entry.event();
                    drop(table);
                    self.shared.metrics.record_failed_load();
                    self.shared.emit(event);
                    return false;
                }
            }
        };

        log::debug!("Fetching {url}");
        self.shared.emit(event);

        let shared = Arc::clone(&self.shared);
        let spawner = self.spawner.clone();
        self.spawner
            .spawn(async move { shared.load(descriptor, element, spawner).await });
        true
    }
}

impl Shared {
    fn register(&self, resources: &[AssetDescriptor]) {
        let mut table = self.table.write();
        let mut order = self.order.write();
        for descriptor in resources {
            if table.contains_key(descriptor.url()) {
                continue;
            }
            order.push(descriptor.url().to_string());
            table.insert(
                descriptor.url().to_string(),
                LoadEntry::new(descriptor.clone()),
            );
        }
    }

    fn emit(&self, event: LoadEvent) {
        self.subscribers
            .write()
            .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }

    /// Apply `status` if `element` still owns the entry
    fn transition(&self, url: &str, element: &Arc<dyn MediaElement>, status: LoadStatus) {
        let event = {
            let mut table = self.table.write();
            let Some(entry) = table.get_mut(url) else {
                return;
            };
            if !owns(entry, element) || !entry.advance(status) {
                return;
            }
            entry.event()
        };
        log::debug!("{url} is now {}", event.status.as_str());
        self.emit(event);
    }

    fn mark_cached(&self, url: &str) {
        let event = {
            let mut table = self.table.write();
            match table.get_mut(url) {
                Some(entry) if !entry.cached => {
                    entry.cached = true;
                    entry.event()
                }
                _ => return,
            }
        };
        self.emit(event);
    }

    /// Full pipeline for one resource: cache lookup, then element load and
    /// persistence side by side
    async fn load<S: AsyncSpawner>(
        self: Arc<Self>,
        descriptor: AssetDescriptor,
        element: Arc<dyn MediaElement>,
        spawner: S,
    ) {
        let url = descriptor.url();
        let warm = match self.lookup(url, &spawner).await {
            Some(bytes) => {
                self.metrics.record_cache_hit();
                self.mark_cached(url);
                Some(bytes)
            }
            None => {
                self.metrics.record_cache_miss();
                None
            }
        };

        let is_warm = warm.is_some();
        let source = warm.map_or(MediaSource::Network, MediaSource::Cached);
        let persist = async {
            if is_warm {
                PersistOutcome::AlreadyCached
            } else {
                self.persist(url).await
            }
        };

        let ((), outcome) =
            future::join(self.drive(&descriptor, &element, source, &spawner), persist)
                .await;

        self.metrics.record_persist(&outcome);
        match &outcome {
            PersistOutcome::CacheUnavailable(err) => {
                log::debug!("Not caching {url}: {err}");
            }
            PersistOutcome::FetchFailed(err) => {
                log::debug!("Not caching {url}, fetch failed: {err}");
            }
            PersistOutcome::Stored | PersistOutcome::AlreadyCached => {}
        }
    }

    /// Cached bytes for `url`, or `None` on a miss, an error, or a lookup
    /// that outlives the configured budget
    async fn lookup<S: AsyncSpawner>(&self, url: &str, spawner: &S) -> Option<Bytes> {
        let budget = spawner.sleep(self.config.cache_lookup_budget);
        match future::select(self.cache.lookup(url), budget).await {
            Either::Left((Ok(found), _)) => found,
            Either::Left((Err(err), _)) => {
                log::debug!("Cache lookup failed for {url}: {err}");
                None
            }
            Either::Right(((), _)) => {
                log::debug!(
                    "Cache lookup for {url} exceeded {:?}, loading from network",
                    self.config.cache_lookup_budget
                );
                None
            }
        }
    }

    /// Load the element, prime video buffers, and mark the resource ready
    async fn drive<S: AsyncSpawner>(
        &self,
        descriptor: &AssetDescriptor,
        element: &Arc<dyn MediaElement>,
        source: MediaSource,
        spawner: &S,
    ) {
        let url = descriptor.url();
        let started_at = Instant::now();

        if let Err(err) = element.load(source).await {
            log::warn!("Failed to load {url}: {err}");
            self.metrics.record_failed_load();
            self.transition(url, element, LoadStatus::Failed(err.to_string()));
            return;
        }
        self.metrics.record_load_time(url, started_at.elapsed());

        if descriptor.kind != AssetKind::Video {
            self.transition(url, element, LoadStatus::Ready);
            return;
        }

        self.transition(url, element, LoadStatus::Buffering);
        let primed = match element.play_muted().await {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Buffer priming skipped for {url}: {err}");
                false
            }
        };
        self.transition(url, element, LoadStatus::Ready);

        if primed {
            spawner.sleep(self.config.prime_pause_delay).await;
            element.pause();
        }
    }

    /// Store the resource's bytes unless they are already cached
    async fn persist(&self, url: &str) -> PersistOutcome {
        match self.cache.contains(url).await {
            Ok(true) => {
                self.mark_cached(url);
                return PersistOutcome::AlreadyCached;
            }
            Ok(false) => {}
            Err(err) => return PersistOutcome::CacheUnavailable(err),
        }

        let bytes = match self.host.fetch_bytes(url).await {
            Ok(bytes) => bytes,
            Err(err) => return PersistOutcome::FetchFailed(err),
        };

        match self.cache.store(url, bytes).await {
            Ok(()) => {
                self.mark_cached(url);
                PersistOutcome::Stored
            }
            Err(err) => PersistOutcome::CacheUnavailable(err),
        }
    }
}

fn owns(entry: &LoadEntry, element: &Arc<dyn MediaElement>) -> bool {
    entry.element.as_ref().is_some_and(|current| {
        std::ptr::addr_eq(Arc::as_ptr(current), Arc::as_ptr(element))
    })
}
