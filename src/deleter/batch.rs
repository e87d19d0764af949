//! Batch deletion using the S3 DeleteObjects API.
//!
//! Splits its input into chunks of up to 1000 refs and issues one
//! DeleteObjects call per chunk, in input order, stopping at the first
//! failure.

use tracing::debug;

use crate::storage::Storage;
use crate::types::error::S3purgeError;
use crate::types::token::PurgeCancellationToken;
use crate::types::{DeletePhase, ObjectVersionRef};

/// Maximum objects per batch DeleteObjects API call (S3 limit).
pub const MAX_BATCH_SIZE: usize = 1000;

/// Deletes object versions or delete markers in batches.
///
/// Earlier chunks are not rolled back when a later one fails; the error
/// records how many refs those chunks had already removed.
pub struct BatchDeleter {
    target: Storage,
    cancellation_token: PurgeCancellationToken,
}

impl BatchDeleter {
    pub fn new(target: Storage, cancellation_token: PurgeCancellationToken) -> Self {
        Self {
            target,
            cancellation_token,
        }
    }

    /// Delete every ref in `objects`.
    ///
    /// An empty input issues no call. The token is checked before each
    /// chunk; a cancelled token yields [`S3purgeError::Cancelled`] without
    /// issuing the call.
    pub async fn delete_all(
        &self,
        objects: &[ObjectVersionRef],
        phase: DeletePhase,
    ) -> Result<(), S3purgeError> {
        let mut deleted = 0;

        for chunk in objects.chunks(MAX_BATCH_SIZE) {
            if self.cancellation_token.is_cancelled() {
                debug!(
                    phase = %phase,
                    deleted = deleted,
                    "delete skipped, cancellation_token is cancelled."
                );
                return Err(S3purgeError::Cancelled);
            }

            debug!(
                phase = %phase,
                batch_size = chunk.len(),
                "sending DeleteObjects batch request."
            );

            self.target
                .delete_objects(chunk)
                .await
                .map_err(|e| S3purgeError::delete(phase, deleted, e))?;

            deleted += chunk.len();
        }

        Ok(())
    }
}
