//! asset_readiness - Prioritized media preloading with a durable cache
//!
//! # Features
//! - Static asset registry with critical/secondary priority classes
//! - One-shot environment policy (mobile/desktop, headless detection)
//! - Preload coordinator with per-resource readiness and a change feed
//! - Video buffer priming that tolerates autoplay restrictions
//! - Durable URL-keyed cache that lets repeat visits skip the network
//! - Host and runtime abstraction (browser binding, local files, mocks)
//!
//! # Quick Start
//!
//! ```ignore
//! use asset_readiness::{site_manifest, MemoryCacheStore, MockHost, MockSpawner,
//!     PreloadConfig, PreloadCoordinator};
//! use std::sync::Arc;
//!
//! let coordinator = PreloadCoordinator::new(
//!     Arc::new(MockHost::new()),
//!     Arc::new(MemoryCacheStore::new()),
//!     MockSpawner::blocking(),
//!     PreloadConfig::default(),
//! );
//! let resources = site_manifest().list_resources(coordinator.policy());
//! coordinator.start(&resources);
//! assert!(coordinator.is_ready("/videos/Home_Background_Video.mp4"));
//! ```
//!
//! # Feature Flags
//!
//! - `runtime-tokio`: Tokio spawner, filesystem host and disk cache store

// Core modules
pub mod cache;
pub mod coordinator;
pub mod host;
pub mod policy;
pub mod registry;
pub mod runtime;

// Support modules
pub mod config;
pub mod contact;

// Error types
mod error;
pub use error::{ReadinessError, Result};

// Re-export registry and policy types
pub use policy::{compute_policy, EnvironmentPolicy, ExecutionContext, PreferredFormat};
pub use registry::{
    site_manifest, AssetDescriptor, AssetKind, AssetRegistry, ManifestEntry, PriorityClass,
};

// Re-export coordinator types
pub use config::PreloadConfig;
pub use coordinator::{LoadEvent, LoadState, LoadStatus, PreloadCoordinator};

// Re-export cache types
#[cfg(feature = "runtime-tokio")]
pub use cache::DiskCacheStore;
pub use cache::{
    CacheError, CacheStore, MemoryCacheStore, PersistOutcome, PreloadMetrics, PreloadMetricsHandle,
};

// Re-export host types
#[cfg(feature = "runtime-tokio")]
pub use host::fs::FsHost;
pub use host::headless::HeadlessHost;
pub use host::mock::{MockElement, MockHost};
pub use host::{ElementView, HostError, MediaElement, MediaHost, MediaSource};

// Re-export runtime types
pub use runtime::mock::{MockSpawnBehavior, MockSpawner};
#[cfg(feature = "runtime-tokio")]
pub use runtime::tokio_impl::TokioSpawner;
pub use runtime::AsyncSpawner;

// Re-export contact types
pub use contact::{
    ContactDispatcher, ContactError, ContactRequest, ContactResponse, ContactSettings,
    EmailMessage, EmailTransport, ProjectType, RecordingTransport,
};

// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
