use tracing::debug;

use crate::config::MAX_KEYS_LIMIT;
use crate::storage::Storage;
use crate::types::error::S3purgeError;
use crate::types::token::PurgeCancellationToken;
use crate::types::{ListingPage, PaginationCursor};

/// Lists the versions of a bucket one page at a time.
///
/// A thin wrapper around `Storage::list_object_versions()` that fixes the
/// page size at construction, checks the cancellation token before every
/// call and wraps provider failures as [`S3purgeError::List`]. It never
/// retries; the SDK retry policy is configured on the client.
pub struct ObjectVersionLister {
    target: Storage,
    max_keys: i32,
    cancellation_token: PurgeCancellationToken,
}

impl ObjectVersionLister {
    /// Fails with `InvalidConfig` unless `max_keys` is in `1..=1000`.
    pub fn new(
        target: Storage,
        max_keys: i32,
        cancellation_token: PurgeCancellationToken,
    ) -> Result<Self, S3purgeError> {
        if !(1..=MAX_KEYS_LIMIT).contains(&max_keys) {
            return Err(S3purgeError::InvalidConfig(format!(
                "max-keys must be between 1 and {MAX_KEYS_LIMIT}: {max_keys}"
            )));
        }

        Ok(Self {
            target,
            max_keys,
            cancellation_token,
        })
    }

    pub fn max_keys(&self) -> i32 {
        self.max_keys
    }

    /// Fetch the page that starts at `cursor`.
    pub async fn list_page(&self, cursor: &PaginationCursor) -> Result<ListingPage, S3purgeError> {
        if self.cancellation_token.is_cancelled() {
            debug!(cursor = %cursor, "listing skipped, cancellation_token is cancelled.");
            return Err(S3purgeError::Cancelled);
        }

        let page = self
            .target
            .list_object_versions(cursor, self.max_keys)
            .await
            .map_err(S3purgeError::list)?;

        debug!(
            versions = page.versions.len(),
            delete_markers = page.delete_markers.len(),
            next_cursor = %page.next_cursor,
            "listed a page of object versions."
        );

        Ok(page)
    }
}
