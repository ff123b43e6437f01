//! One-shot classification of the device/network environment
//!
//! The policy is computed once per process from the viewport width at load
//! time and is not re-evaluated on resize.

use crate::config::PreloadConfig;
use crate::host::MediaHost;

/// Which encoding of a resource to prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferredFormat {
    /// Standard-quality encoding
    Primary,
    /// Bandwidth-reduced encoding, when one exists
    Lightweight,
}

/// Where the pipeline is executing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionContext {
    /// A browser with window/document globals
    Browser,
    /// No browser globals (static analysis, build-time evaluation)
    Headless,
}

/// Process-wide environment classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentPolicy {
    /// Whether secondary resources should be deferred to first use
    pub is_constrained_bandwidth: bool,
    /// Encoding to select from the registry
    pub preferred_format: PreferredFormat,
    /// Execution context the policy was computed in
    pub context: ExecutionContext,
}

impl EnvironmentPolicy {
    /// Desktop-class browser policy
    pub fn unconstrained() -> Self {
        Self {
            is_constrained_bandwidth: false,
            preferred_format: PreferredFormat::Primary,
            context: ExecutionContext::Browser,
        }
    }

    /// Mobile-class browser policy
    pub fn constrained() -> Self {
        Self {
            is_constrained_bandwidth: true,
            preferred_format: PreferredFormat::Lightweight,
            context: ExecutionContext::Browser,
        }
    }

    /// Conservative policy used when browser globals are absent
    pub fn headless() -> Self {
        Self {
            is_constrained_bandwidth: true,
            preferred_format: PreferredFormat::Lightweight,
            context: ExecutionContext::Headless,
        }
    }

    /// Classify a viewport width against `breakpoint`
    pub fn from_viewport(width: u32, breakpoint: u32) -> Self {
        if width < breakpoint {
            Self::constrained()
        } else {
            Self::unconstrained()
        }
    }

    /// Whether any preloading may happen at all
    pub fn preload_enabled(&self) -> bool {
        self.context == ExecutionContext::Browser
    }
}

/// Compute the policy from the host's viewport width
///
/// Never fails: a host without a viewport yields [`EnvironmentPolicy::headless`].
pub fn compute_policy(host: &dyn MediaHost, config: &PreloadConfig) -> EnvironmentPolicy {
    let policy = match host.viewport_width() {
        Some(width) => EnvironmentPolicy::from_viewport(width, config.mobile_breakpoint),
        None => EnvironmentPolicy::headless(),
    };
    log::debug!(
        "Environment policy on {}: {:?} (breakpoint {}px)",
        host.name(),
        policy,
        config.mobile_breakpoint
    );
    policy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::headless::HeadlessHost;
    use crate::host::mock::MockHost;

    #[test]
    fn test_below_breakpoint_is_constrained() {
        let policy = EnvironmentPolicy::from_viewport(767, 768);
        assert!(policy.is_constrained_bandwidth);
        assert_eq!(policy.preferred_format, PreferredFormat::Lightweight);
    }

    #[test]
    fn test_at_breakpoint_is_unconstrained() {
        let policy = EnvironmentPolicy::from_viewport(768, 768);
        assert!(!policy.is_constrained_bandwidth);
        assert_eq!(policy.preferred_format, PreferredFormat::Primary);
        assert!(policy.preload_enabled());
    }

    #[test]
    fn test_compute_from_mock_host() {
        let config = PreloadConfig::default();
        let desktop = compute_policy(&MockHost::with_viewport(1440), &config);
        assert_eq!(desktop, EnvironmentPolicy::unconstrained());

        let phone = compute_policy(&MockHost::with_viewport(390), &config);
        assert_eq!(phone, EnvironmentPolicy::constrained());
    }

    #[test]
    fn test_headless_is_conservative() {
        let policy = compute_policy(&HeadlessHost::new(), &PreloadConfig::default());
        assert!(policy.is_constrained_bandwidth);
        assert_eq!(policy.context, ExecutionContext::Headless);
        assert!(!policy.preload_enabled());
    }
}
