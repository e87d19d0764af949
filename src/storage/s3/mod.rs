pub mod client_builder;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::delete_objects::DeleteObjectsOutput;
use aws_sdk_s3::operation::list_object_versions::ListObjectVersionsOutput;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use std::sync::Arc;

use crate::storage::StorageTrait;
use crate::types::token::PurgeCancellationToken;
use crate::types::{ListingPage, ObjectVersionRef, PaginationCursor};

/// Extracts the S3 error code and message from an AWS SDK error.
///
/// For service errors (S3 API responses), returns the S3 error code
/// (e.g. "AccessDenied", "InternalError") and the human-readable error
/// message from the response. For other error types (network, timeout,
/// construction failure), returns "N/A" as the code and the full error
/// description as the message.
fn extract_sdk_error_details<E: std::fmt::Display + ProvideErrorMetadata>(
    e: &SdkError<E>,
) -> (String, String) {
    if let Some(service_err) = e.as_service_error() {
        (
            service_err.code().unwrap_or("unknown").to_string(),
            service_err.message().unwrap_or("no message").to_string(),
        )
    } else {
        ("N/A".to_string(), e.to_string())
    }
}

/// S3 storage for a single versioned bucket.
///
/// Every in-flight request races the cancellation token; if the token wins,
/// the request is dropped and the call returns an error.
#[derive(Clone)]
pub struct S3Storage {
    client: Arc<Client>,
    bucket: String,
    cancellation_token: PurgeCancellationToken,
}

impl S3Storage {
    pub fn new(client: Client, bucket: &str, cancellation_token: PurgeCancellationToken) -> Self {
        Self {
            client: Arc::new(client),
            bucket: bucket.to_string(),
            cancellation_token,
        }
    }
}

#[async_trait]
impl StorageTrait for S3Storage {
    async fn list_object_versions(
        &self,
        cursor: &PaginationCursor,
        max_keys: i32,
    ) -> Result<ListingPage> {
        tracing::debug!(
            bucket = self.bucket,
            key_marker = cursor.key_marker(),
            version_id_marker = cursor.version_id_marker(),
            max_keys = max_keys,
            "Calling ListObjectVersions API."
        );

        let request = self
            .client
            .list_object_versions()
            .bucket(&self.bucket)
            .set_key_marker(cursor.key_marker().map(String::from))
            .set_version_id_marker(cursor.version_id_marker().map(String::from))
            .max_keys(max_keys)
            .send();

        let output = tokio::select! {
            biased;

            _ = self.cancellation_token.cancelled() => {
                return Err(anyhow!("ListObjectVersions call for s3://{} was cancelled.", self.bucket));
            }
            result = request => result.map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    bucket = self.bucket,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 ListObjectVersions API call failed for s3://{}: {} ({}).",
                    self.bucket,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow!(e).context("aws_sdk_s3::client::list_object_versions() failed.")
            })?,
        };

        let page = listing_page_from_output(&output).inspect_err(|e| {
            tracing::error!(bucket = self.bucket, "{e}");
        })?;
        tracing::trace!(
            bucket = self.bucket,
            versions = page.versions.len(),
            delete_markers = page.delete_markers.len(),
            next_cursor = %page.next_cursor,
            "ListObjectVersions API call succeeded."
        );

        Ok(page)
    }

    async fn delete_objects(&self, objects: &[ObjectVersionRef]) -> Result<()> {
        let object_count = objects.len();

        let identifiers = objects
            .iter()
            .map(|object| {
                ObjectIdentifier::builder()
                    .key(object.key())
                    .version_id(object.version_id())
                    .build()
                    .context("Failed to build ObjectIdentifier")
            })
            .collect::<Result<Vec<_>>>()?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .context("Failed to build Delete request")?;

        tracing::debug!(
            bucket = self.bucket,
            object_count = object_count,
            "Calling DeleteObjects API with {} objects.",
            object_count
        );

        let request = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send();

        let output = tokio::select! {
            biased;

            _ = self.cancellation_token.cancelled() => {
                return Err(anyhow!("DeleteObjects call for s3://{} was cancelled.", self.bucket));
            }
            result = request => result.map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                tracing::error!(
                    bucket = self.bucket,
                    object_count = object_count,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 DeleteObjects API call failed for {} objects in s3://{}: {} ({}).",
                    object_count,
                    self.bucket,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow!(e).context("aws_sdk_s3::client::delete_objects() failed.")
            })?,
        };

        check_delete_errors(&self.bucket, &output)
    }
}

/// Translate a ListObjectVersions response into a [`ListingPage`].
///
/// The next markers are passed through exactly as the response reports them.
/// An entry without a key or version id cannot be deleted, so it fails the
/// page instead of being skipped.
fn listing_page_from_output(output: &ListObjectVersionsOutput) -> Result<ListingPage> {
    let versions = output
        .versions()
        .iter()
        .map(|version| version_ref("version", version.key(), version.version_id()))
        .collect::<Result<Vec<_>>>()?;

    let delete_markers = output
        .delete_markers()
        .iter()
        .map(|marker| version_ref("delete marker", marker.key(), marker.version_id()))
        .collect::<Result<Vec<_>>>()?;

    Ok(ListingPage {
        versions,
        delete_markers,
        next_cursor: PaginationCursor::from_markers(
            output.next_key_marker().map(String::from),
            output.next_version_id_marker().map(String::from),
        ),
    })
}

fn version_ref(
    kind: &str,
    key: Option<&str>,
    version_id: Option<&str>,
) -> Result<ObjectVersionRef> {
    match (key, version_id) {
        (Some(key), Some(version_id)) => Ok(ObjectVersionRef::new(key, version_id)),
        _ => Err(anyhow!(
            "ListObjectVersions returned a {kind} without key or version id (key: {}, version id: {}).",
            key.unwrap_or("-"),
            version_id.unwrap_or("-")
        )),
    }
}

/// Fail the whole call if DeleteObjects reported any per-key error.
fn check_delete_errors(bucket: &str, output: &DeleteObjectsOutput) -> Result<()> {
    let errors = output.errors();
    let Some(first) = errors.first() else {
        return Ok(());
    };

    let key = first.key().unwrap_or_default();
    let version_id = first.version_id().unwrap_or_default();
    let code = first.code().unwrap_or("unknown");
    let message = first.message().unwrap_or("no message");

    tracing::error!(
        bucket = bucket,
        error_count = errors.len(),
        key = key,
        version_id = version_id,
        s3_error_code = code,
        s3_error_message = message,
        "S3 DeleteObjects reported {} failed keys in s3://{}.",
        errors.len(),
        bucket,
    );

    Err(anyhow!(
        "DeleteObjects failed for {} keys, first: {} (version {}): {} ({})",
        errors.len(),
        key,
        version_id,
        code,
        message
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::test_utils::init_dummy_tracing_subscriber;
    use crate::types::token::create_purge_cancellation_token;
    use aws_sdk_s3::types::{DeleteMarkerEntry, Error as S3Error, ObjectVersion};

    #[test]
    fn listing_page_splits_versions_and_delete_markers() {
        let output = ListObjectVersionsOutput::builder()
            .versions(ObjectVersion::builder().key("a").version_id("v1").build())
            .versions(ObjectVersion::builder().key("b").version_id("v2").build())
            .delete_markers(DeleteMarkerEntry::builder().key("c").version_id("d1").build())
            .is_truncated(true)
            .next_key_marker("b")
            .next_version_id_marker("v2")
            .build();

        let page = listing_page_from_output(&output).unwrap();

        assert_eq!(
            page.versions,
            vec![ObjectVersionRef::new("a", "v1"), ObjectVersionRef::new("b", "v2")]
        );
        assert_eq!(page.delete_markers, vec![ObjectVersionRef::new("c", "d1")]);
        assert_eq!(page.next_cursor.key_marker(), Some("b"));
        assert_eq!(page.next_cursor.version_id_marker(), Some("v2"));
    }

    #[test]
    fn listing_page_rejects_version_without_version_id() {
        let output = ListObjectVersionsOutput::builder()
            .versions(ObjectVersion::builder().key("ok").version_id("null").build())
            .versions(ObjectVersion::builder().key("no-version").build())
            .build();

        let err = listing_page_from_output(&output).unwrap_err();
        assert!(err.to_string().contains("no-version"));
    }

    #[test]
    fn listing_page_rejects_delete_marker_without_key() {
        let output = ListObjectVersionsOutput::builder()
            .delete_markers(DeleteMarkerEntry::builder().version_id("d1").build())
            .build();

        let err = listing_page_from_output(&output).unwrap_err();
        assert!(err.to_string().contains("delete marker"));
    }

    #[test]
    fn empty_output_is_a_final_page() {
        let page = listing_page_from_output(&ListObjectVersionsOutput::builder().build()).unwrap();
        assert!(page.is_final());
    }

    #[test]
    fn delete_output_without_errors_is_ok() {
        init_dummy_tracing_subscriber();

        let output = DeleteObjectsOutput::builder().build();
        assert!(check_delete_errors("test-bucket", &output).is_ok());
    }

    #[test]
    fn delete_output_with_key_errors_fails() {
        init_dummy_tracing_subscriber();

        let output = DeleteObjectsOutput::builder()
            .errors(
                S3Error::builder()
                    .key("locked.txt")
                    .version_id("v9")
                    .code("AccessDenied")
                    .message("Access Denied")
                    .build(),
            )
            .errors(S3Error::builder().key("other.txt").build())
            .build();

        let err = check_delete_errors("test-bucket", &output).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("2 keys"));
        assert!(message.contains("locked.txt"));
        assert!(message.contains("AccessDenied"));
    }

    async fn create_test_storage(
        cancellation_token: PurgeCancellationToken,
    ) -> S3Storage {
        let client_config = ClientConfig {
            region: Some("us-east-1".to_string()),
            endpoint_url: Some("http://127.0.0.1:1".to_string()),
            ..ClientConfig::default()
        };
        S3Storage::new(
            client_config.create_client().await,
            "test-bucket",
            cancellation_token,
        )
    }

    #[tokio::test]
    async fn cancelled_token_abandons_list_call() {
        init_dummy_tracing_subscriber();

        let cancellation_token = create_purge_cancellation_token();
        cancellation_token.cancel();
        let storage = create_test_storage(cancellation_token).await;

        let err = storage
            .list_object_versions(&PaginationCursor::start(), 1000)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }

    #[tokio::test]
    async fn cancelled_token_abandons_delete_call() {
        init_dummy_tracing_subscriber();

        let cancellation_token = create_purge_cancellation_token();
        cancellation_token.cancel();
        let storage = create_test_storage(cancellation_token).await;

        let err = storage
            .delete_objects(&[ObjectVersionRef::new("a", "v1")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }
}
