//! Tokio async runtime implementation
//!
//! Provides integration with the Tokio async runtime.

use super::{AsyncSpawner, BoxFuture};
use std::future::Future;
use std::time::Duration;

/// Tokio-based async spawner
///
/// Spawns tasks on the ambient Tokio runtime. Outside a runtime, tasks are
/// logged and dropped.
#[derive(Clone, Debug, Default, Copy)]
pub struct TokioSpawner;

impl TokioSpawner {
    /// Create a new Tokio spawner
    pub fn new() -> Self {
        Self
    }
}

impl AsyncSpawner for TokioSpawner {
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(task);
            }
            Err(err) => log::warn!("Dropping task, no Tokio runtime available: {err}"),
        }
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }

    fn runtime_name(&self) -> &'static str {
        "Tokio"
    }
}
