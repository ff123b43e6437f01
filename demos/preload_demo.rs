//! Preload demo: serve a throwaway document root, preload the site
//! manifest, then start again against the same disk cache.
//!
//! Run with `RUST_LOG=debug cargo run --example preload_demo --features runtime-tokio`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use asset_readiness::{
    site_manifest, AssetRegistry, DiskCacheStore, FsHost, LoadStatus, PreloadConfig,
    PreloadCoordinator, TokioSpawner,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let site = tempfile::tempdir().context("creating document root")?;
    let cache = tempfile::tempdir().context("creating cache root")?;
    let registry = site_manifest();
    write_fake_site(site.path(), &registry)?;

    for (run, viewport) in [(1, 1440), (2, 1440), (3, 390)] {
        let config = PreloadConfig::default();
        let coordinator = PreloadCoordinator::new(
            Arc::new(FsHost::new(site.path(), viewport)),
            Arc::new(DiskCacheStore::new(cache.path(), config.cache_namespace.clone())),
            TokioSpawner::new(),
            config,
        );
        let resources = registry.list_resources(coordinator.policy());
        coordinator.start(&resources);

        tokio::time::sleep(Duration::from_millis(250)).await;

        println!("\nRun {run} (viewport {viewport}px):");
        for state in coordinator.states() {
            let status = match &state.status {
                LoadStatus::Failed(reason) => format!("failed ({reason})"),
                other => other.as_str().to_string(),
            };
            println!(
                "  {:<45} {:<10} cached={}",
                state.descriptor.url(),
                status,
                state.cached
            );
        }
        println!(
            "  cache hit rate: {:.0}%",
            coordinator.metrics().cache_hit_rate()
        );
        coordinator.dispose();
    }

    Ok(())
}

fn write_fake_site(root: &std::path::Path, registry: &AssetRegistry) -> anyhow::Result<()> {
    for entry in registry.entries() {
        let url = &entry.url;
        let path = root.join(url.trim_start_matches('/'));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&path, format!("fake media for {url}"))
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
