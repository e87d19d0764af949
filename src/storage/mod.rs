use anyhow::Result;
use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::config::Config;
use crate::types::error::S3purgeError;
use crate::types::token::PurgeCancellationToken;
use crate::types::{ListingPage, ObjectVersionRef, PaginationCursor};

pub mod s3;

/// Type alias for a boxed Storage trait object.
pub type Storage = Box<dyn StorageTrait + Send + Sync>;

/// The two provider calls a purge needs.
///
/// Implementations translate provider responses into crate types at this
/// boundary; nothing above it sees SDK types. Neither method retries at the
/// purge level (the SDK may still retry transport failures internally).
#[async_trait]
pub trait StorageTrait: DynClone {
    /// Fetch one page of versions and delete markers starting at `cursor`.
    ///
    /// An entry missing its key or version id fails the call. The returned cursor
    /// carries the provider's next markers exactly as reported; it is
    /// exhausted when the provider reported none.
    async fn list_object_versions(
        &self,
        cursor: &PaginationCursor,
        max_keys: i32,
    ) -> Result<ListingPage>;

    /// Delete up to 1000 refs in a single DeleteObjects call.
    ///
    /// The call either succeeds for every ref or returns an error. A response
    /// that reports per-key errors counts as a failure of the whole call.
    async fn delete_objects(&self, objects: &[ObjectVersionRef]) -> Result<()>;
}

dyn_clone::clone_trait_object!(StorageTrait);

/// Create the S3 storage for `config.bucket`.
///
/// Fails with `InvalidConfig` when the config carries no client settings.
pub async fn create_storage(
    config: &Config,
    cancellation_token: PurgeCancellationToken,
) -> Result<Storage, S3purgeError> {
    let Some(client_config) = config.target_client_config.as_ref() else {
        return Err(S3purgeError::InvalidConfig(
            "no S3 client configuration was provided".to_string(),
        ));
    };
    if config.bucket.is_empty() {
        return Err(S3purgeError::InvalidConfig(
            "bucket name must not be empty".to_string(),
        ));
    }

    let client = client_config.create_client().await;

    Ok(Box::new(s3::S3Storage::new(
        client,
        &config.bucket,
        cancellation_token,
    )))
}
