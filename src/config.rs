//! Tunables for the preload pipeline

use std::time::Duration;

/// Viewport widths strictly below this are treated as mobile
pub const DEFAULT_MOBILE_BREAKPOINT: u32 = 768;

/// Delay between muted playback and the pause that ends buffer priming
pub const DEFAULT_PRIME_PAUSE_DELAY: Duration = Duration::from_millis(100);

/// How long a load waits on the durable cache before going to the network
pub const DEFAULT_CACHE_LOOKUP_BUDGET: Duration = Duration::from_millis(50);

/// Namespace that scopes durable cache entries
pub const DEFAULT_CACHE_NAMESPACE: &str = "asset-readiness-v1";

/// Configuration for policy computation and the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadConfig {
    /// Viewport width (px) below which bandwidth is considered constrained
    pub mobile_breakpoint: u32,
    /// How long a primed video plays before being paused again
    pub prime_pause_delay: Duration,
    /// Durable cache namespace; bump to invalidate previously stored bytes
    pub cache_namespace: String,
    /// Upper bound on a durable cache lookup before loading from the network
    pub cache_lookup_budget: Duration,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            prime_pause_delay: DEFAULT_PRIME_PAUSE_DELAY,
            cache_namespace: DEFAULT_CACHE_NAMESPACE.to_string(),
            cache_lookup_budget: DEFAULT_CACHE_LOOKUP_BUDGET,
        }
    }
}

impl PreloadConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mobile breakpoint
    pub fn with_mobile_breakpoint(mut self, px: u32) -> Self {
        self.mobile_breakpoint = px;
        self
    }

    /// Set the buffer-priming pause delay
    pub fn with_prime_pause_delay(mut self, delay: Duration) -> Self {
        self.prime_pause_delay = delay;
        self
    }

    /// Set the durable cache namespace
    pub fn with_cache_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.cache_namespace = namespace.into();
        self
    }

    /// Set the cache lookup budget
    pub fn with_cache_lookup_budget(mut self, budget: Duration) -> Self {
        self.cache_lookup_budget = budget;
        self
    }
}
