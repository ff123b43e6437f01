//! Host for contexts without browser globals
//!
//! Used when the site is evaluated outside a browser. It reports no
//! viewport and refuses every media operation.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use super::{HostError, HostResult, MediaElement, MediaHost};
use crate::registry::AssetKind;

/// Host with no window, document or media APIs
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadlessHost;

impl HeadlessHost {
    /// Create a headless host
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaHost for HeadlessHost {
    fn viewport_width(&self) -> Option<u32> {
        None
    }

    fn create_element(&self, _kind: AssetKind, _url: &str) -> HostResult<Arc<dyn MediaElement>> {
        Err(HostError::Unsupported)
    }

    async fn fetch_bytes(&self, _url: &str) -> HostResult<Bytes> {
        Err(HostError::Unsupported)
    }

    fn name(&self) -> &'static str {
        "Headless"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_refuses_everything() {
        let host = HeadlessHost::new();
        assert_eq!(host.viewport_width(), None);
        assert!(matches!(
            host.create_element(AssetKind::Image, "a.png"),
            Err(HostError::Unsupported)
        ));
        let fetched = futures::executor::block_on(host.fetch_bytes("a.png"));
        assert_eq!(fetched, Err(HostError::Unsupported));
    }
}
