//! Integration tests for environment policy and registry selection

use asset_readiness::{
    compute_policy, site_manifest, EnvironmentPolicy, ExecutionContext, HeadlessHost, MockHost,
    PreferredFormat, PreloadConfig, PriorityClass,
};

#[test]
fn test_policy_from_viewport() {
    let config = PreloadConfig::default();

    let desktop = compute_policy(&MockHost::with_viewport(1920), &config);
    assert!(!desktop.is_constrained_bandwidth);
    assert_eq!(desktop.preferred_format, PreferredFormat::Primary);

    let phone = compute_policy(&MockHost::with_viewport(390), &config);
    assert!(phone.is_constrained_bandwidth);
    assert_eq!(phone.preferred_format, PreferredFormat::Lightweight);
}

#[test]
fn test_custom_breakpoint() {
    let config = PreloadConfig::default().with_mobile_breakpoint(1024);
    let tablet = compute_policy(&MockHost::with_viewport(900), &config);
    assert!(tablet.is_constrained_bandwidth);
}

#[test]
fn test_headless_policy() {
    let policy = compute_policy(&HeadlessHost::new(), &PreloadConfig::default());
    assert_eq!(policy, EnvironmentPolicy::headless());
    assert_eq!(policy.context, ExecutionContext::Headless);
}

#[test]
fn test_site_manifest_selection() {
    let registry = site_manifest();

    let desktop = registry.list_resources(&EnvironmentPolicy::unconstrained());
    let mobile = registry.list_resources(&EnvironmentPolicy::constrained());
    assert_eq!(desktop[0].url(), "/videos/Home_Background_Video.mp4");
    // The site ships one encoding per asset, so every device gets the same URLs.
    assert_eq!(desktop, mobile);
    assert!(registry
        .entries()
        .iter()
        .all(|entry| entry.lightweight_url.is_none()));

    // Critical entries lead the manifest.
    let first_secondary = desktop
        .iter()
        .position(|descriptor| descriptor.priority == PriorityClass::Secondary)
        .unwrap();
    assert!(desktop[first_secondary..]
        .iter()
        .all(|descriptor| descriptor.priority == PriorityClass::Secondary));
}
