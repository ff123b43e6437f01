//! Integration tests for the preload coordinator lifecycle

use asset_readiness::{
    AssetDescriptor, AssetKind, EnvironmentPolicy, HeadlessHost, LoadStatus, MediaElement,
    MediaSource, MemoryCacheStore, MockHost, MockSpawner, PreloadConfig, PreloadCoordinator,
    PriorityClass,
};
use std::sync::Arc;

fn registry() -> Vec<AssetDescriptor> {
    vec![
        AssetDescriptor::new("hero.mp4", AssetKind::Video, PriorityClass::Critical),
        AssetDescriptor::new("preview.png", AssetKind::Image, PriorityClass::Secondary),
    ]
}

fn coordinator(
    host: &MockHost,
    spawner: MockSpawner,
    policy: EnvironmentPolicy,
) -> PreloadCoordinator<MockSpawner> {
    PreloadCoordinator::with_policy(
        Arc::new(host.clone()),
        Arc::new(MemoryCacheStore::new()),
        spawner,
        PreloadConfig::default(),
        policy,
    )
}

/// Desktop coordinator that runs loads to completion inline
fn desktop(host: &MockHost) -> PreloadCoordinator<MockSpawner> {
    coordinator(host, MockSpawner::blocking(), EnvironmentPolicy::unconstrained())
}

#[test]
fn test_unconstrained_scenario() {
    let host = MockHost::new();
    let spawner = MockSpawner::queued();
    let coordinator = coordinator(&host, spawner.clone(), EnvironmentPolicy::unconstrained());

    assert!(coordinator.start(&registry()));

    // Both loads are issued immediately, neither has completed yet.
    assert_eq!(coordinator.get_state("hero.mp4").unwrap().status, LoadStatus::Fetching);
    assert_eq!(coordinator.get_state("preview.png").unwrap().status, LoadStatus::Fetching);

    spawner.run_pending();

    assert!(coordinator.is_ready("hero.mp4"));
    assert!(coordinator.is_ready("preview.png"));
    assert_eq!(host.initiation_order(), vec!["hero.mp4", "preview.png"]);
}

#[test]
fn test_constrained_scenario() {
    let host = MockHost::with_viewport(375);
    let coordinator = coordinator(&host, MockSpawner::blocking(), EnvironmentPolicy::constrained());

    coordinator.start(&registry());

    assert!(coordinator.is_ready("hero.mp4"));
    let preview = coordinator.get_state("preview.png").unwrap();
    assert_eq!(preview.status, LoadStatus::Pending);
    assert!(preview.element.is_none());
    assert_eq!(host.load_attempts("preview.png"), 0);
}

#[test]
fn test_critical_loads_regardless_of_policy() {
    for policy in [EnvironmentPolicy::unconstrained(), EnvironmentPolicy::constrained()] {
        let host = MockHost::new();
        let coordinator = coordinator(&host, MockSpawner::blocking(), policy);
        coordinator.start(&registry());
        assert_eq!(host.load_attempts("hero.mp4"), 1);
    }
}

#[test]
fn test_critical_initiated_before_secondary() {
    let host = MockHost::new();
    let coordinator = desktop(&host);

    // Manifest lists the secondary resource first.
    coordinator.start(&[
        AssetDescriptor::secondary_image("a.png"),
        AssetDescriptor::critical_video("hero.mp4"),
        AssetDescriptor::secondary_image("b.png"),
        AssetDescriptor::critical_video("about.mp4"),
    ]);

    assert_eq!(
        host.initiation_order(),
        vec!["hero.mp4", "about.mp4", "a.png", "b.png"]
    );
}

#[test]
fn test_start_is_idempotent() {
    let host = MockHost::new();
    let spawner = MockSpawner::queued();
    let coordinator = coordinator(&host, spawner.clone(), EnvironmentPolicy::unconstrained());

    assert!(coordinator.start(&registry()));
    assert!(!coordinator.start(&registry()));
    spawner.run_pending();
    assert!(!coordinator.start(&registry()));

    assert_eq!(host.load_attempts("hero.mp4"), 1);
    assert_eq!(host.load_attempts("preview.png"), 1);
    assert_eq!(spawner.pending(), 0);
}

#[test]
fn test_duplicate_resources_load_once() {
    let host = MockHost::new();
    let coordinator = desktop(&host);

    coordinator.start(&[
        AssetDescriptor::critical_video("hero.mp4"),
        AssetDescriptor::critical_video("hero.mp4"),
    ]);

    assert_eq!(host.load_attempts("hero.mp4"), 1);
    assert_eq!(coordinator.states().len(), 1);
}

#[test]
fn test_headless_start_issues_nothing() {
    let coordinator = PreloadCoordinator::new(
        Arc::new(HeadlessHost::new()),
        Arc::new(MemoryCacheStore::new()),
        MockSpawner::blocking(),
        PreloadConfig::default(),
    );

    assert!(coordinator.policy().is_constrained_bandwidth);
    assert!(coordinator.start(&registry()));
    assert!(coordinator.states().iter().all(|state| state.is_pending()));
    assert!(!coordinator.request("hero.mp4"));
    coordinator.dispose();
}

#[test]
fn test_load_failure_is_terminal() {
    let host = MockHost::new();
    host.fail_load("preview.png");
    let coordinator = desktop(&host);

    coordinator.start(&registry());

    let preview = coordinator.get_state("preview.png").unwrap();
    assert!(preview.is_failed());
    assert!(coordinator.is_ready("hero.mp4"));

    // No automatic retry, and request does not revive a failed resource.
    assert!(!coordinator.request("preview.png"));
    assert_eq!(host.load_attempts("preview.png"), 1);
    assert_eq!(coordinator.metrics().failed_loads(), 1);
}

#[test]
fn test_explicit_retry() {
    let host = MockHost::new();
    host.fail_load("preview.png");
    let spawner = MockSpawner::queued();
    let coordinator = coordinator(&host, spawner.clone(), EnvironmentPolicy::unconstrained());

    coordinator.start(&registry());
    spawner.run_pending();
    assert!(coordinator.get_state("preview.png").unwrap().is_failed());

    assert!(coordinator.retry("preview.png"));
    assert_eq!(
        coordinator.get_state("preview.png").unwrap().status,
        LoadStatus::Fetching
    );
    spawner.run_pending();

    // The first attempt still persisted the bytes, so the retry is served
    // from the durable cache and never touches the failing network load.
    assert_eq!(host.load_attempts("preview.png"), 2);
    assert!(coordinator.is_ready("preview.png"));
    assert!(matches!(
        host.element("preview.png").unwrap().loaded_from(),
        Some(MediaSource::Cached(_))
    ));
    assert!(!coordinator.retry("hero.mp4"));
}

#[test]
fn test_request_loads_deferred_resource() {
    let host = MockHost::with_viewport(375);
    let coordinator = coordinator(&host, MockSpawner::blocking(), EnvironmentPolicy::constrained());

    coordinator.start(&registry());
    assert!(coordinator.get_state("preview.png").unwrap().is_pending());

    assert!(coordinator.request("preview.png"));
    assert!(coordinator.is_ready("preview.png"));
    assert!(!coordinator.request("preview.png"));
    assert_eq!(host.load_attempts("preview.png"), 1);
}

#[test]
fn test_autoplay_denial_still_ready() {
    let host = MockHost::new();
    host.deny_autoplay();
    let coordinator = desktop(&host);

    coordinator.start(&registry());

    assert!(coordinator.is_ready("hero.mp4"));
    assert_eq!(host.element("hero.mp4").unwrap().play_calls(), 1);
    assert_eq!(host.playing_count(), 0);
}

#[test]
fn test_subscription_sees_transitions() {
    let host = MockHost::new();
    let coordinator = desktop(&host);
    let mut events = coordinator.subscribe();

    coordinator.start(&[AssetDescriptor::critical_video("hero.mp4")]);

    let mut statuses = Vec::new();
    while let Ok(Some(event)) = events.try_next() {
        assert_eq!(event.url, "hero.mp4");
        if statuses.last() != Some(&event.status) {
            statuses.push(event.status);
        }
    }
    assert_eq!(
        statuses,
        vec![LoadStatus::Fetching, LoadStatus::Buffering, LoadStatus::Ready]
    );
}

#[test]
fn test_dropped_subscriber_does_not_affect_others() {
    let host = MockHost::new();
    let coordinator = desktop(&host);
    let dropped = coordinator.subscribe();
    let mut live = coordinator.subscribe();
    drop(dropped);

    host.fail_load("broken.png");
    coordinator.start(&[
        AssetDescriptor::secondary_image("preview.png"),
        AssetDescriptor::secondary_image("broken.png"),
    ]);

    assert!(coordinator.get_state("broken.png").unwrap().is_failed());

    let mut statuses = Vec::new();
    while let Ok(Some(event)) = live.try_next() {
        if event.url == "preview.png" {
            statuses.push(event.status);
        }
    }
    assert!(statuses.contains(&LoadStatus::Fetching));
    assert!(statuses.contains(&LoadStatus::Ready));

    // Transitions still go through once every receiver is gone.
    drop(live);
    assert!(coordinator.retry("broken.png"));
    // The first attempt persisted the bytes, so the retry loads from cache.
    assert!(coordinator.is_ready("broken.png"));
    assert_eq!(host.load_attempts("broken.png"), 2);
}

#[test]
fn test_dispose_pauses_playing_elements() {
    let host = MockHost::new();
    let spawner = MockSpawner::queued();
    let coordinator = coordinator(&host, spawner.clone(), EnvironmentPolicy::unconstrained());

    coordinator.start(&[AssetDescriptor::critical_video("hero.mp4")]);
    let element = host.element("hero.mp4").unwrap();
    futures::executor::block_on(element.play_muted()).unwrap();
    assert_eq!(host.playing_count(), 1);

    coordinator.dispose();
    assert_eq!(host.playing_count(), 0);

    let state = coordinator.get_state("hero.mp4").unwrap();
    assert!(!state.element.unwrap().is_playing());
}
