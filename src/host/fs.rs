//! Host backed by a local document root
//!
//! Resolves resource URLs against a directory, the way a static site server
//! would, and reads bytes with `tokio::fs`. Useful for warming a durable
//! cache from a build output and for end-to-end tests on a real runtime.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{HostError, HostResult, MediaElement, MediaHost, MediaSource};
use crate::registry::AssetKind;

/// Host that serves assets from a directory
#[derive(Clone, Debug)]
pub struct FsHost {
    root: PathBuf,
    viewport: u32,
}

impl FsHost {
    /// Create a host serving `root`, reporting `viewport` as its width
    pub fn new(root: impl Into<PathBuf>, viewport: u32) -> Self {
        Self {
            root: root.into(),
            viewport,
        }
    }

    /// Map `url` to a file under `root`, dropping query and fragment
    ///
    /// Paths with `..` segments are refused so a URL cannot leave the root.
    fn resolve(root: &Path, url: &str) -> HostResult<PathBuf> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
        {
            return Err(HostError::Network {
                url: url.to_string(),
                reason: "path escapes the document root".into(),
            });
        }
        Ok(root.join(relative))
    }

    async fn read(root: &Path, url: &str) -> HostResult<Bytes> {
        let path = Self::resolve(root, url)?;
        tokio::fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|err| HostError::Network {
                url: url.to_string(),
                reason: err.to_string(),
            })
    }
}

#[async_trait]
impl MediaHost for FsHost {
    fn viewport_width(&self) -> Option<u32> {
        Some(self.viewport)
    }

    fn create_element(&self, kind: AssetKind, url: &str) -> HostResult<Arc<dyn MediaElement>> {
        Ok(Arc::new(FsElement {
            kind,
            url: url.to_string(),
            root: self.root.clone(),
            playing: AtomicBool::new(false),
            data: RwLock::new(None),
        }))
    }

    async fn fetch_bytes(&self, url: &str) -> HostResult<Bytes> {
        Self::read(&self.root, url).await
    }

    fn name(&self) -> &'static str {
        "Fs"
    }
}

/// Element that holds the bytes it loaded
#[derive(Debug)]
pub struct FsElement {
    kind: AssetKind,
    url: String,
    root: PathBuf,
    playing: AtomicBool,
    data: RwLock<Option<Bytes>>,
}

impl FsElement {
    /// Size of the loaded payload
    pub fn loaded_len(&self) -> Option<usize> {
        self.data.read().as_ref().map(Bytes::len)
    }
}

#[async_trait]
impl MediaElement for FsElement {
    fn kind(&self) -> AssetKind {
        self.kind
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn load(&self, source: MediaSource) -> HostResult<()> {
        let bytes = match source {
            MediaSource::Cached(bytes) => bytes,
            MediaSource::Network => FsHost::read(&self.root, &self.url).await?,
        };
        if bytes.is_empty() {
            return Err(HostError::Decode(format!("{} is empty", self.url)));
        }
        *self.data.write() = Some(bytes);
        Ok(())
    }

    async fn play_muted(&self) -> HostResult<()> {
        if self.kind != AssetKind::Video {
            return Err(HostError::Unsupported);
        }
        if self.data.read().is_none() {
            return Err(HostError::PlaybackDenied("no data loaded".into()));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_host_loads_from_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("videos")).unwrap();
        std::fs::write(root.path().join("videos/hero.mp4"), b"mp4").unwrap();

        let host = FsHost::new(root.path(), 1024);
        let element = host
            .create_element(AssetKind::Video, "/videos/hero.mp4?v=2")
            .unwrap();
        element.load(MediaSource::Network).await.unwrap();
        element.play_muted().await.unwrap();
        assert!(element.is_playing());
        element.pause();
        assert!(!element.is_playing());

        assert_eq!(
            host.fetch_bytes("/videos/hero.mp4").await,
            Ok(Bytes::from_static(b"mp4"))
        );
    }

    #[tokio::test]
    async fn test_fs_host_refuses_parent_segments() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"secret").unwrap();
        let root = outer.path().join("site");
        std::fs::create_dir_all(&root).unwrap();

        let host = FsHost::new(&root, 1024);
        assert!(matches!(
            host.fetch_bytes("/../secret.txt").await,
            Err(HostError::Network { .. })
        ));
        let element = host
            .create_element(AssetKind::Image, "/assets/../../secret.txt")
            .unwrap();
        assert!(element.load(MediaSource::Network).await.is_err());
    }

    #[test]
    fn test_resolve_keeps_plain_paths() {
        let root = Path::new("/srv/site");
        assert_eq!(
            FsHost::resolve(root, "/assets/./a.png#top"),
            Ok(root.join("assets/./a.png"))
        );
    }

    #[tokio::test]
    async fn test_fs_host_missing_file_is_network_error() {
        let root = tempfile::tempdir().unwrap();
        let host = FsHost::new(root.path(), 1024);
        let element = host.create_element(AssetKind::Image, "/missing.png").unwrap();
        assert!(matches!(
            element.load(MediaSource::Network).await,
            Err(HostError::Network { .. })
        ));
    }
}
