//! Per-resource load lifecycle
//!
//! ```text
//! pending -> fetching -> buffering -> ready
//!    \          \           \
//!     +----------+-----------+--> failed --(retry)--> pending
//! ```
//!
//! Transitions only move forward, except the explicit retry edge.

use crate::host::{ElementView, MediaElement};
use crate::registry::AssetDescriptor;
use std::sync::Arc;

/// Lifecycle status of a managed resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Registered, no load issued yet
    Pending,

    /// Element created and loading
    Fetching,

    /// Initial data arrived, video buffer priming in progress
    Buffering,

    /// Displayable without further network waiting
    Ready,

    /// Load failed with an error message
    Failed(String),
}

impl LoadStatus {
    fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Fetching => 1,
            Self::Buffering => 2,
            Self::Ready => 3,
            Self::Failed(_) => 4,
        }
    }

    /// Whether moving from `self` to `next` is allowed outside of retry
    pub fn can_advance_to(&self, next: &LoadStatus) -> bool {
        match (self, next) {
            (Self::Ready, _) | (Self::Failed(_), _) => false,
            (_, Self::Failed(_)) => true,
            _ => next.rank() > self.rank(),
        }
    }

    /// Whether a load is in flight
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Fetching | Self::Buffering)
    }

    /// Short lowercase name, for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Buffering => "buffering",
            Self::Ready => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// Snapshot of one resource's load state
///
/// Returned by value from the coordinator; the element handle is read-only.
#[derive(Debug, Clone)]
pub struct LoadState {
    /// The resource this state tracks
    pub descriptor: AssetDescriptor,
    /// Current lifecycle status
    pub status: LoadStatus,
    /// Whether the bytes are confirmed present in the durable cache
    pub cached: bool,
    /// The element driving the load, once one was created
    pub element: Option<ElementView>,
}

impl LoadState {
    /// Check if the resource can be displayed
    pub fn is_ready(&self) -> bool {
        self.status == LoadStatus::Ready
    }

    /// Check if loading failed
    pub fn is_failed(&self) -> bool {
        matches!(self.status, LoadStatus::Failed(_))
    }

    /// Check if the resource is waiting for a load to be issued
    pub fn is_pending(&self) -> bool {
        self.status == LoadStatus::Pending
    }
}

/// Notification of a state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadEvent {
    /// Resource URL
    pub url: String,
    /// Status after the change
    pub status: LoadStatus,
    /// Cache flag after the change
    pub cached: bool,
}

/// Coordinator-owned record behind a [`LoadState`]
pub(crate) struct LoadEntry {
    pub(crate) descriptor: AssetDescriptor,
    pub(crate) status: LoadStatus,
    pub(crate) cached: bool,
    pub(crate) element: Option<Arc<dyn MediaElement>>,
}

impl LoadEntry {
    pub(crate) fn new(descriptor: AssetDescriptor) -> Self {
        Self {
            descriptor,
            status: LoadStatus::Pending,
            cached: false,
            element: None,
        }
    }

    /// Apply a forward transition; returns false if it was rejected
    pub(crate) fn advance(&mut self, next: LoadStatus) -> bool {
        if !self.status.can_advance_to(&next) {
            log::debug!(
                "Ignoring {} -> {} for {}",
                self.status.as_str(),
                next.as_str(),
                self.descriptor.url()
            );
            return false;
        }
        self.status = next;
        true
    }

    /// The retry edge: `failed -> pending`, dropping the failed element
    pub(crate) fn reset_failed(&mut self) -> bool {
        if !matches!(self.status, LoadStatus::Failed(_)) {
            return false;
        }
        self.status = LoadStatus::Pending;
        self.element = None;
        true
    }

    pub(crate) fn snapshot(&self) -> LoadState {
        LoadState {
            descriptor: self.descriptor.clone(),
            status: self.status.clone(),
            cached: self.cached,
            element: self.element.clone().map(ElementView::new),
        }
    }

    pub(crate) fn event(&self) -> LoadEvent {
        LoadEvent {
            url: self.descriptor.url().to_string(),
            status: self.status.clone(),
            cached: self.cached,
        }
    }
}
