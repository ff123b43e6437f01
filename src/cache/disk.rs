//! File-backed cache store
//!
//! One file per URL under `<root>/<namespace>/`, named by the xxh3 hash of
//! the URL. Writes land in a temporary file unique to the writer and are
//! renamed into place, so readers never observe a partial entry.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use super::{cache_key, CacheResult, CacheStore};

static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Durable store on the local filesystem
#[derive(Clone, Debug)]
pub struct DiskCacheStore {
    dir: PathBuf,
    namespace: String,
}

impl DiskCacheStore {
    /// Create a store rooted at `root`, scoped to `namespace`
    ///
    /// The directory is created lazily on first write.
    pub fn new(root: impl AsRef<Path>, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            dir: root.as_ref().join(&namespace),
            namespace,
        }
    }

    /// Directory holding this namespace's entries
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir
            .join(format!("{}.bin", cache_key(&self.namespace, url)))
    }

    fn temp_path(&self, url: &str) -> PathBuf {
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            "{}.{}.{seq}.tmp",
            cache_key(&self.namespace, url),
            std::process::id()
        ))
    }
}

#[async_trait]
impl CacheStore for DiskCacheStore {
    async fn lookup(&self, url: &str) -> CacheResult<Option<Bytes>> {
        match tokio::fs::read(self.entry_path(url)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn store(&self, url: &str, bytes: Bytes) -> CacheResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.entry_path(url);
        let tmp = self.temp_path(url);
        let written = match tokio::fs::write(&tmp, &bytes).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        log::debug!("Cached {} bytes for {url} at {}", bytes.len(), path.display());
        Ok(())
    }

    async fn contains(&self, url: &str) -> CacheResult<bool> {
        Ok(tokio::fs::try_exists(self.entry_path(url)).await?)
    }
}
