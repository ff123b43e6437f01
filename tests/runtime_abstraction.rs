//! Integration tests for async runtime abstraction

use asset_readiness::{AsyncSpawner, MockSpawnBehavior, MockSpawner};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_mock_spawner_integration() {
    let spawner = MockSpawner::blocking();

    let executed = Arc::new(AtomicBool::new(false));
    let executed_clone = Arc::clone(&executed);

    spawner.spawn(async move {
        executed_clone.store(true, Ordering::SeqCst);
    });

    // In blocking mode, should execute immediately
    assert!(executed.load(Ordering::SeqCst));
}

#[test]
fn test_spawner_trait_bound() {
    fn spawn_task<S: AsyncSpawner>(spawner: &S) {
        let sleeper = spawner.clone();
        spawner.spawn(async move {
            sleeper.sleep(Duration::from_millis(1)).await;
        });
    }

    let spawner = MockSpawner::with_behavior(MockSpawnBehavior::Queue);
    spawn_task(&spawner);
    assert_eq!(spawner.pending(), 1);
    assert_eq!(spawner.run_pending(), 1);
}

#[cfg(feature = "runtime-tokio")]
#[test]
fn test_tokio_start_without_runtime_does_not_panic() {
    use asset_readiness::{
        AssetDescriptor, EnvironmentPolicy, LoadStatus, MemoryCacheStore, MockHost,
        PreloadConfig, PreloadCoordinator, TokioSpawner,
    };

    let host = MockHost::new();
    let coordinator = PreloadCoordinator::with_policy(
        Arc::new(host.clone()),
        Arc::new(MemoryCacheStore::new()),
        TokioSpawner::new(),
        PreloadConfig::default(),
        EnvironmentPolicy::unconstrained(),
    );

    assert!(coordinator.start(&[AssetDescriptor::critical_video("hero.mp4")]));
    let state = coordinator.get_state("hero.mp4").unwrap();
    assert_eq!(state.status, LoadStatus::Fetching);
    assert_eq!(host.load_attempts("hero.mp4"), 0);
}
