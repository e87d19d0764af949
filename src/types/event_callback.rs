//! Event callback trait and event data types for purge events.
//!
//! The orchestrator reports progress only through these events, so a purge
//! has no hidden logging state of its own. Register an [`EventCallback`] on
//! the [`EventManager`](crate::callback::event_manager::EventManager) in
//! [`Config`](crate::Config) to observe a run.

use async_trait::async_trait;
use bitflags::bitflags;

use crate::types::DeletePhase;

bitflags! {
    /// Event type flags for filtering which events a callback receives.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    pub struct EventType: u64 {
        const UNDEFINED = 0u64;
        const PURGE_START = 1u64 << 1;
        const PURGE_END = 1u64 << 2;
        const PURGE_ERROR = 1u64 << 3;
        const PURGE_CANCEL = 1u64 << 4;
        const LIST_PAGE_REQUEST = 1u64 << 5;
        const LIST_PAGE_RESULT = 1u64 << 6;
        const VERSIONS_DELETED = 1u64 << 7;
        const DELETE_MARKERS_DELETED = 1u64 << 8;
        const STATS_REPORT = 1u64 << 9;
        const ALL_EVENTS = !0;
    }
}

impl EventType {
    /// The event reported after a successful delete of `phase`.
    pub fn deleted(phase: DeletePhase) -> Self {
        match phase {
            DeletePhase::Versions => EventType::VERSIONS_DELETED,
            DeletePhase::DeleteMarkers => EventType::DELETE_MARKERS_DELETED,
        }
    }
}

/// Structured event data passed to event callbacks.
#[derive(Default, Debug, Clone)]
pub struct EventData {
    pub event_type: EventType,
    pub bucket: Option<String>,
    pub key_marker: Option<String>,
    pub version_id_marker: Option<String>,
    pub version_count: Option<u64>,
    pub delete_marker_count: Option<u64>,
    pub error_message: Option<String>,

    // Statistics fields (populated in STATS_REPORT events)
    pub stats_listed_pages: Option<u64>,
    pub stats_deleted_versions: Option<u64>,
    pub stats_deleted_delete_markers: Option<u64>,
    pub stats_duration_sec: Option<f64>,
    pub stats_objects_per_sec: Option<f64>,
}

impl EventData {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            ..Default::default()
        }
    }
}

/// Trait for event callbacks that receive purge events.
///
/// # Notes
///
/// - Callbacks are called serially for each event
/// - Callbacks should return promptly; the purge waits for them
#[async_trait]
pub trait EventCallback: Send {
    async fn on_event(&mut self, event_data: EventData);
}
