//! Purge orchestrator.
//!
//! Drives the list → delete loop over a bucket's version listing until the
//! listing is drained, accumulating the two counters of [`PurgeResult`] and
//! stopping at the first error.
//!
//! ```text
//! start cursor → list page → delete versions → delete delete markers ─┐
//!      ▲                                                               │
//!      └──────────── next cursor (unless the page is final) ◄──────────┘
//! ```

use tracing::debug;

use crate::config::Config;
use crate::deleter::BatchDeleter;
use crate::lister::ObjectVersionLister;
use crate::storage::{self, Storage};
use crate::types::error::{PurgeFailure, S3purgeError};
use crate::types::event_callback::{EventData, EventType};
use crate::types::token::PurgeCancellationToken;
use crate::types::{DeletePhase, ObjectVersionRef, PaginationCursor, PurgeResult};


/// Purges every object version and delete marker from one bucket.
///
/// The run is strictly sequential: one list or delete call in flight at a
/// time. Nothing is retried at this level, and a failure keeps whatever was
/// already deleted. Running the purge again continues from there.
///
/// ## Usage
///
/// ```no_run
/// # async fn example() {
/// use s3purge_rs::{Config, PurgeOrchestrator, create_purge_cancellation_token};
///
/// let config = Config::for_bucket("my-versioned-bucket");
/// let cancellation_token = create_purge_cancellation_token();
/// let orchestrator = PurgeOrchestrator::new(config, cancellation_token)
///     .await
///     .unwrap();
///
/// match orchestrator.run().await {
///     Ok(result) => println!("deleted {} entries", result.total()),
///     Err(failure) => eprintln!("{} (after {} deletions)", failure, failure.progress.total()),
/// }
/// # }
/// ```
pub struct PurgeOrchestrator {
    config: Config,
    lister: ObjectVersionLister,
    deleter: BatchDeleter,
    cancellation_token: PurgeCancellationToken,
}

impl PurgeOrchestrator {
    /// Create an orchestrator backed by S3.
    ///
    /// Fails with `InvalidConfig` if the config has no client settings, an
    /// empty bucket or an out-of-range `max_keys`.
    pub async fn new(
        config: Config,
        cancellation_token: PurgeCancellationToken,
    ) -> Result<Self, S3purgeError> {
        let target = storage::create_storage(&config, cancellation_token.clone()).await?;
        Self::with_storage(config, target, cancellation_token)
    }

    /// Create an orchestrator over an existing storage.
    pub fn with_storage(
        config: Config,
        target: Storage,
        cancellation_token: PurgeCancellationToken,
    ) -> Result<Self, S3purgeError> {
        let lister =
            ObjectVersionLister::new(target.clone(), config.max_keys, cancellation_token.clone())?;
        let deleter = BatchDeleter::new(target, cancellation_token.clone());

        Ok(Self {
            config,
            lister,
            deleter,
            cancellation_token,
        })
    }

    /// Run the purge until the listing is drained or a call fails.
    ///
    /// On failure the returned [`PurgeFailure`] carries the counts reached
    /// before the error.
    pub async fn run(&self) -> Result<PurgeResult, PurgeFailure> {
        debug!(bucket = self.config.bucket, "purge has started.");
        self.trigger(EventData::new(EventType::PURGE_START)).await;

        let mut progress = PurgeResult::default();
        let outcome = self.drain(&mut progress).await;

        if let Err(e) = &outcome {
            self.fire_failure_events(e).await;
        }
        self.trigger(EventData::new(EventType::PURGE_END)).await;

        match outcome {
            Ok(()) => {
                debug!(
                    bucket = self.config.bucket,
                    deleted_versions = progress.deleted_versions,
                    deleted_delete_markers = progress.deleted_delete_markers,
                    "purge has been completed."
                );
                Ok(progress)
            }
            Err(e) => Err(PurgeFailure::new(progress, e)),
        }
    }

    async fn drain(&self, progress: &mut PurgeResult) -> Result<(), S3purgeError> {
        let mut cursor = PaginationCursor::start();

        loop {
            let mut request = EventData::new(EventType::LIST_PAGE_REQUEST);
            request.key_marker = cursor.key_marker().map(String::from);
            request.version_id_marker = cursor.version_id_marker().map(String::from);
            self.trigger(request).await;

            let page = self.lister.list_page(&cursor).await?;

            let mut result = EventData::new(EventType::LIST_PAGE_RESULT);
            result.version_count = Some(page.versions.len() as u64);
            result.delete_marker_count = Some(page.delete_markers.len() as u64);
            self.trigger(result).await;

            if !page.versions.is_empty() {
                self.delete(&page.versions, DeletePhase::Versions).await?;
                progress.deleted_versions += page.versions.len() as u64;
            }

            if !page.delete_markers.is_empty() {
                self.delete(&page.delete_markers, DeletePhase::DeleteMarkers)
                    .await?;
                progress.deleted_delete_markers += page.delete_markers.len() as u64;
            }

            // A page with entries is never final, even without a continuation.
            if page.is_final() {
                return Ok(());
            }
            cursor = page.next_cursor;
        }
    }

    async fn delete(
        &self,
        objects: &[ObjectVersionRef],
        phase: DeletePhase,
    ) -> Result<(), S3purgeError> {
        self.deleter.delete_all(objects, phase).await?;

        let mut event_data = EventData::new(EventType::deleted(phase));
        match phase {
            DeletePhase::Versions => event_data.version_count = Some(objects.len() as u64),
            DeletePhase::DeleteMarkers => {
                event_data.delete_marker_count = Some(objects.len() as u64)
            }
        }
        self.trigger(event_data).await;

        Ok(())
    }

    async fn fire_failure_events(&self, e: &S3purgeError) {
        if !e.is_cancelled() {
            let mut event_data = EventData::new(EventType::PURGE_ERROR);
            event_data.error_message = Some(e.to_string());
            self.trigger(event_data).await;
        }

        if e.is_cancelled() || self.cancellation_token.is_cancelled() {
            self.trigger(EventData::new(EventType::PURGE_CANCEL)).await;
        }
    }

    async fn trigger(&self, mut event_data: EventData) {
        event_data.bucket = Some(self.config.bucket.clone());
        self.config.event_manager.trigger_event(event_data).await;
    }
}
