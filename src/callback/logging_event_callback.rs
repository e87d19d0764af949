use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::types::event_callback::{EventCallback, EventData, EventType};

/// Event callback that writes purge progress as `tracing` log lines.
///
/// The CLI registers this callback so every listing call and every
/// successful delete shows up as an `info` line. With `-q` the subscriber
/// filters these out and the purge itself runs unchanged.
#[derive(Debug, Default)]
pub struct LoggingEventCallback;

impl LoggingEventCallback {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventCallback for LoggingEventCallback {
    async fn on_event(&mut self, event_data: EventData) {
        let bucket = event_data.bucket.as_deref().unwrap_or_default();

        match event_data.event_type {
            EventType::LIST_PAGE_REQUEST => {
                info!(
                    bucket = bucket,
                    key_marker = event_data.key_marker,
                    version_id_marker = event_data.version_id_marker,
                    "Calling ListObjectVersions API."
                );
            }
            EventType::LIST_PAGE_RESULT => {
                info!(
                    bucket = bucket,
                    versions = event_data.version_count,
                    delete_markers = event_data.delete_marker_count,
                    "Retrieved {} versions and {} delete markers from s3://{}.",
                    event_data.version_count.unwrap_or(0),
                    event_data.delete_marker_count.unwrap_or(0),
                    bucket,
                );
            }
            EventType::VERSIONS_DELETED => {
                info!(
                    bucket = bucket,
                    "Deleted {} versions.",
                    event_data.version_count.unwrap_or(0)
                );
            }
            EventType::DELETE_MARKERS_DELETED => {
                info!(
                    bucket = bucket,
                    "Deleted {} delete markers.",
                    event_data.delete_marker_count.unwrap_or(0)
                );
            }
            EventType::PURGE_CANCEL => {
                warn!(bucket = bucket, "purge has been cancelled.");
            }
            EventType::PURGE_ERROR => {
                error!(
                    bucket = bucket,
                    error = event_data.error_message,
                    "purge failed."
                );
            }
            EventType::STATS_REPORT => {
                info!(
                    listed_pages = event_data.stats_listed_pages,
                    deleted_versions = event_data.stats_deleted_versions,
                    deleted_delete_markers = event_data.stats_deleted_delete_markers,
                    duration_sec = event_data.stats_duration_sec,
                    objects_per_sec = event_data.stats_objects_per_sec,
                    "purge statistics."
                );
            }
            _ => {}
        }
    }
}
