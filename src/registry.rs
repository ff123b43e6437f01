//! Static manifest of the media resources the site depends on
//!
//! The registry is built once and never mutated. Selecting the concrete
//! URL for each entry depends on the [`EnvironmentPolicy`], so listing is a
//! pure function of the manifest and the policy.

use std::collections::HashSet;

use crate::policy::{EnvironmentPolicy, PreferredFormat};

/// Kind of media resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Video resource, eligible for buffer priming
    Video,
    /// Still image
    Image,
}

/// Coarse load priority
///
/// Declaration order is load order: `Critical` sorts before `Secondary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriorityClass {
    /// Critical-path hero content, loaded regardless of bandwidth policy
    Critical,
    /// Project previews, skipped on constrained bandwidth
    Secondary,
}

/// One media resource selected for the current environment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetDescriptor {
    url: String,
    /// Kind of media behind the URL
    pub kind: AssetKind,
    /// Load priority
    pub priority: PriorityClass,
}

impl AssetDescriptor {
    /// Create a descriptor for `url`
    pub fn new(url: impl Into<String>, kind: AssetKind, priority: PriorityClass) -> Self {
        Self {
            url: url.into(),
            kind,
            priority,
        }
    }

    /// Shorthand for a critical video
    pub fn critical_video(url: impl Into<String>) -> Self {
        Self::new(url, AssetKind::Video, PriorityClass::Critical)
    }

    /// Shorthand for a secondary image
    pub fn secondary_image(url: impl Into<String>) -> Self {
        Self::new(url, AssetKind::Image, PriorityClass::Secondary)
    }

    /// Resource URL, stable for the lifetime of the descriptor
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether bandwidth policy may defer this resource
    pub fn is_deferrable(&self) -> bool {
        self.priority == PriorityClass::Secondary
    }
}

/// A manifest entry: a logical resource with an optional lighter encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Standard-quality URL
    pub url: String,
    /// Bandwidth-reduced encoding of the same resource, if one exists
    pub lightweight_url: Option<String>,
    /// Kind of media
    pub kind: AssetKind,
    /// Load priority
    pub priority: PriorityClass,
}

impl ManifestEntry {
    /// Create an entry without a lightweight variant
    pub fn new(url: impl Into<String>, kind: AssetKind, priority: PriorityClass) -> Self {
        Self {
            url: url.into(),
            lightweight_url: None,
            kind,
            priority,
        }
    }

    /// Attach a lightweight variant
    pub fn with_lightweight(mut self, url: impl Into<String>) -> Self {
        self.lightweight_url = Some(url.into());
        self
    }

    fn select(&self, format: PreferredFormat) -> AssetDescriptor {
        let url = match (format, &self.lightweight_url) {
            (PreferredFormat::Lightweight, Some(light)) => light.clone(),
            _ => self.url.clone(),
        };
        AssetDescriptor::new(url, self.kind, self.priority)
    }
}

/// Immutable manifest of managed media
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    entries: Vec<ManifestEntry>,
}

impl AssetRegistry {
    /// Build a registry from manifest entries
    ///
    /// Entries whose standard URL was already registered are dropped, so
    /// registering the same resource twice is harmless.
    pub fn new(entries: impl IntoIterator<Item = ManifestEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.url.clone()))
            .collect();
        Self { entries }
    }

    /// The manifest entries in registration order
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resources to manage under `policy`, in manifest order
    ///
    /// Picks the lightweight variant when the policy prefers it. Two entries
    /// that resolve to the same URL collapse to the first one.
    pub fn list_resources(&self, policy: &EnvironmentPolicy) -> Vec<AssetDescriptor> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|entry| entry.select(policy.preferred_format))
            .filter(|descriptor| seen.insert(descriptor.url.clone()))
            .collect()
    }
}

/// The site's own media manifest
pub fn site_manifest() -> AssetRegistry {
    use AssetKind::{Image, Video};
    use PriorityClass::{Critical, Secondary};

    AssetRegistry::new([
        ManifestEntry::new("/videos/Home_Background_Video.mp4", Video, Critical),
        ManifestEntry::new("/videos/About_Video.mp4", Video, Critical),
        ManifestEntry::new("/assets/better-video-ai-demo.mp4", Video, Secondary),
        ManifestEntry::new("/assets/deckcraft-demo.mp4", Video, Secondary),
        ManifestEntry::new("/assets/better-video-ai-landing.png", Image, Secondary),
        ManifestEntry::new("/assets/deckcraft-landing.png", Image, Secondary),
    ])
}
