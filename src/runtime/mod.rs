//! Async runtime abstraction for the preload pipeline
//!
//! The coordinator spawns one task per resource and uses a deferred timer
//! for buffer priming. Both go through [`AsyncSpawner`] so the pipeline
//! runs on tokio, on a browser event loop binding, or synchronously in tests.

pub mod mock;
#[cfg(feature = "runtime-tokio")]
pub mod tokio_impl;

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A boxed future that can be sent across threads
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async task spawner trait
///
/// Spawning never blocks the caller; completion is observed through the
/// coordinator's state table, not through a handle.
///
/// # Example
/// ```ignore
/// let spawner = TokioSpawner::new();
/// spawner.spawn(async {
///     // Async work here
/// });
/// ```
pub trait AsyncSpawner: Send + Sync + Clone + Debug + 'static {
    /// Spawn a fire-and-forget task
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// A future that resolves after `duration`
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;

    /// Get the name of this runtime (for debugging)
    fn runtime_name(&self) -> &'static str;
}

// Re-export implementations
pub use mock::{MockSpawnBehavior, MockSpawner};

#[cfg(feature = "runtime-tokio")]
pub use tokio_impl::TokioSpawner;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawner_trait_object_bounds() {
        fn name_of<S: AsyncSpawner>(spawner: &S) -> &'static str {
            spawner.runtime_name()
        }
        assert_eq!(name_of(&MockSpawner::blocking()), "Mock");
    }
}
