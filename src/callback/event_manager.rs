//! Event callback manager.
//!
//! Manages event callback registration and dispatching for a purge run.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::types::event_callback::{EventCallback, EventData, EventType};

/// Accumulated purge statistics for the STATS_REPORT event.
#[derive(Default, Debug, Clone)]
pub struct PurgeStats {
    pub purge_start_time: Option<Instant>,
    pub stats_listed_pages: u64,
    pub stats_deleted_versions: u64,
    pub stats_deleted_delete_markers: u64,
    pub stats_duration_sec: f64,
    pub stats_objects_per_sec: f64,
}

impl From<PurgeStats> for EventData {
    fn from(stats: PurgeStats) -> Self {
        let mut event_data = EventData::new(EventType::STATS_REPORT);
        event_data.stats_listed_pages = Some(stats.stats_listed_pages);
        event_data.stats_deleted_versions = Some(stats.stats_deleted_versions);
        event_data.stats_deleted_delete_markers = Some(stats.stats_deleted_delete_markers);
        event_data.stats_duration_sec = Some(stats.stats_duration_sec);
        event_data.stats_objects_per_sec = Some(stats.stats_objects_per_sec);
        event_data
    }
}

/// Manages event callback registration and dispatching.
///
/// Holds an optional `EventCallback` trait object and accumulated purge statistics.
/// On `PURGE_END`, sends a `STATS_REPORT` event with accumulated stats if the caller
/// subscribed to `STATS_REPORT` via `event_flags`.
#[derive(Clone)]
pub struct EventManager {
    pub event_callback: Option<Arc<Mutex<Box<dyn EventCallback + Send + Sync>>>>,
    pub event_flags: EventType,
    pub purge_stats: Arc<Mutex<PurgeStats>>,
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EventManager {
    pub fn new() -> Self {
        Self {
            event_callback: None,
            event_flags: EventType::ALL_EVENTS,
            purge_stats: Arc::new(Mutex::new(PurgeStats::default())),
        }
    }

    /// Register an event callback with an event type filter.
    pub fn register_callback<T: EventCallback + Send + Sync + 'static>(
        &mut self,
        events_flag: EventType,
        callback: T,
    ) {
        self.event_callback = Some(Arc::new(Mutex::new(Box::new(callback))));
        self.event_flags = events_flag;
    }

    /// Returns true if an event callback has been registered.
    pub fn is_callback_registered(&self) -> bool {
        self.event_callback.is_some()
    }

    /// Trigger an event, updating internal stats and dispatching to the callback.
    pub async fn trigger_event(&self, event_data: EventData) {
        self.update_purge_stats(&event_data).await;

        if let Some(callback) = &self.event_callback {
            let event_type = event_data.event_type;
            let bucket = event_data.bucket.clone();
            if self.event_flags.contains(event_type) {
                callback.lock().await.on_event(event_data).await;
            }
            if event_type == EventType::PURGE_END
                && self.event_flags.contains(EventType::STATS_REPORT)
            {
                let mut stats_report: EventData = self.purge_stats.lock().await.clone().into();
                stats_report.bucket = bucket;
                callback.lock().await.on_event(stats_report).await;
            }
        }
    }

    /// Snapshot of the statistics accumulated so far.
    pub async fn get_purge_stats(&self) -> PurgeStats {
        self.purge_stats.lock().await.clone()
    }

    async fn update_purge_stats(&self, event_data: &EventData) {
        let mut stats = self.purge_stats.lock().await;

        match event_data.event_type {
            // Clones of a Config share these stats; each run starts from zero.
            EventType::PURGE_START => {
                *stats = PurgeStats {
                    purge_start_time: Some(Instant::now()),
                    ..PurgeStats::default()
                };
            }
            EventType::PURGE_END => {
                if let Some(start) = stats.purge_start_time {
                    let deleted = stats.stats_deleted_versions + stats.stats_deleted_delete_markers;
                    stats.stats_duration_sec = start.elapsed().as_secs_f64();
                    if stats.stats_duration_sec > 1.0 {
                        stats.stats_objects_per_sec = deleted as f64 / stats.stats_duration_sec;
                    } else {
                        stats.stats_objects_per_sec = deleted as f64;
                    }
                }
            }
            EventType::LIST_PAGE_RESULT => {
                stats.stats_listed_pages += 1;
            }
            EventType::VERSIONS_DELETED => {
                stats.stats_deleted_versions += event_data.version_count.unwrap_or(0);
            }
            EventType::DELETE_MARKERS_DELETED => {
                stats.stats_deleted_delete_markers += event_data.delete_marker_count.unwrap_or(0);
            }
            _ => {}
        }
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("event_flags", &self.event_flags)
            .field("callback_registered", &self.event_callback.is_some())
            .finish()
    }
}
