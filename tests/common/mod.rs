//! Shared E2E test infrastructure for s3purge-rs.
//!
//! Provides `TestHelper` for versioned bucket management, object operations,
//! and purge execution against real AWS S3. All helpers use the
//! `s3purge-e2e-test` AWS profile.

#![allow(dead_code)]

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::types::{
    BucketLocationConstraint, BucketVersioningStatus, CreateBucketConfiguration, Delete,
    ObjectIdentifier, VersioningConfiguration,
};
use s3purge_rs::config::args::build_config_from_args;
use s3purge_rs::{
    Config, PurgeFailure, PurgeOrchestrator, PurgeResult, create_purge_cancellation_token,
};
use uuid::Uuid;

/// AWS profile used for all E2E tests.
const AWS_PROFILE: &str = "s3purge-e2e-test";

/// Fallback region when the profile does not name one.
const DEFAULT_REGION: &str = "us-east-1";

/// RAII guard that deletes all versions and the bucket when dropped.
///
/// Cleanup runs even if the test panics. Call `TestHelper::bucket_guard()`
/// right after creating a bucket.
pub struct BucketGuard {
    helper: Arc<TestHelper>,
    bucket: String,
}

impl BucketGuard {
    /// Clean up explicitly at the end of a test body, while the runtime is
    /// still able to drive the requests.
    pub async fn cleanup(self) {
        self.helper.delete_bucket_cascade(&self.bucket).await;
    }
}

impl Drop for BucketGuard {
    fn drop(&mut self) {
        let helper = self.helper.clone();
        let bucket = self.bucket.clone();
        // block_on() may panic while the runtime is shutting down.
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tokio::runtime::Handle::current().block_on(async move {
                helper.delete_bucket_cascade(&bucket).await;
            });
        }));
    }
}

/// Shared test helper for E2E tests.
pub struct TestHelper {
    client: Client,
    region: String,
}

impl TestHelper {
    pub async fn new() -> Arc<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(AWS_PROFILE)
            .load()
            .await;

        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let client = Client::new(&sdk_config);

        Arc::new(Self { client, region })
    }

    pub fn bucket_guard(self: &Arc<Self>, bucket: &str) -> BucketGuard {
        BucketGuard {
            helper: Arc::clone(self),
            bucket: bucket.to_string(),
        }
    }

    /// Returns a name like `s3purge-e2e-<uuid>`.
    pub fn generate_bucket_name(&self) -> String {
        format!("s3purge-e2e-{}", Uuid::new_v4())
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    // -----------------------------------------------------------------------
    // Bucket management
    // -----------------------------------------------------------------------

    /// Create a bucket and enable versioning on it.
    pub async fn create_versioned_bucket(&self, bucket: &str) {
        let mut builder = self.client.create_bucket().bucket(bucket);

        // us-east-1 must NOT specify a location constraint
        if self.region != "us-east-1" {
            let constraint = BucketLocationConstraint::from(self.region.as_str());
            let config = CreateBucketConfiguration::builder()
                .location_constraint(constraint)
                .build();
            builder = builder.create_bucket_configuration(config);
        }

        builder
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to create bucket {bucket}: {e}"));

        let versioning_config = VersioningConfiguration::builder()
            .status(BucketVersioningStatus::Enabled)
            .build();

        self.client
            .put_bucket_versioning()
            .bucket(bucket)
            .versioning_configuration(versioning_config)
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to enable versioning on {bucket}: {e}"));
    }

    /// Delete every version and delete marker, then the bucket itself.
    ///
    /// Independent of the crate under test; errors are ignored.
    pub async fn delete_bucket_cascade(&self, bucket: &str) {
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;

        loop {
            let resp = match self
                .client
                .list_object_versions()
                .bucket(bucket)
                .set_key_marker(key_marker.clone())
                .set_version_id_marker(version_id_marker.clone())
                .send()
                .await
            {
                Ok(r) => r,
                Err(_) => break,
            };

            let versions = resp
                .versions()
                .iter()
                .filter_map(|v| v.key().zip(v.version_id()));
            let markers = resp
                .delete_markers()
                .iter()
                .filter_map(|m| m.key().zip(m.version_id()));
            let objects: Vec<ObjectIdentifier> = versions
                .chain(markers)
                .map(|(key, vid)| {
                    ObjectIdentifier::builder()
                        .key(key)
                        .version_id(vid)
                        .build()
                        .unwrap()
                })
                .collect();

            for chunk in objects.chunks(1000) {
                let delete = Delete::builder()
                    .set_objects(Some(chunk.to_vec()))
                    .quiet(true)
                    .build()
                    .unwrap();
                let _ = self
                    .client
                    .delete_objects()
                    .bucket(bucket)
                    .delete(delete)
                    .send()
                    .await;
            }

            if resp.is_truncated() == Some(true) {
                key_marker = resp.next_key_marker().map(|s| s.to_string());
                version_id_marker = resp.next_version_id_marker().map(|s| s.to_string());
            } else {
                break;
            }
        }

        let _ = self.client.delete_bucket().bucket(bucket).send().await;
    }

    // -----------------------------------------------------------------------
    // Object operations
    // -----------------------------------------------------------------------

    pub async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.into())
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to put object {key} in {bucket}: {e}"));
    }

    /// Upload `count` objects named `{prefix}{i}` with up to 32 requests in flight.
    pub async fn put_objects_parallel(&self, bucket: &str, prefix: &str, count: usize) {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(32));
        let mut handles = Vec::with_capacity(count);

        for i in 0..count {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let client = self.client.clone();
            let bucket = bucket.to_string();
            let key = format!("{prefix}{i}");
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                client
                    .put_object()
                    .bucket(&bucket)
                    .key(&key)
                    .body(key.clone().into_bytes().into())
                    .send()
                    .await
                    .unwrap_or_else(|e| panic!("Failed to put object {key} in {bucket}: {e}"));
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
    }

    /// Delete the current version of `key` without a version id, leaving a
    /// delete marker behind.
    pub async fn create_delete_marker(&self, bucket: &str, key: &str) {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to delete object {key} in {bucket}: {e}"));
    }

    /// Count (versions, delete markers) remaining in a bucket.
    pub async fn count_versions_and_markers(&self, bucket: &str) -> (usize, usize) {
        let mut versions = 0;
        let mut markers = 0;
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_object_versions()
                .bucket(bucket)
                .set_key_marker(key_marker.clone())
                .set_version_id_marker(version_id_marker.clone())
                .send()
                .await
                .unwrap_or_else(|e| panic!("Failed to list object versions in {bucket}: {e}"));

            versions += resp.versions().len();
            markers += resp.delete_markers().len();

            if resp.is_truncated() == Some(true) {
                key_marker = resp.next_key_marker().map(|s| s.to_string());
                version_id_marker = resp.next_version_id_marker().map(|s| s.to_string());
            } else {
                break;
            }
        }

        (versions, markers)
    }

    // -----------------------------------------------------------------------
    // Purge helpers
    // -----------------------------------------------------------------------

    /// Build a `Config` from CLI-style arguments.
    ///
    /// Prepends the binary name ("s3purge") and appends
    /// `--target-profile s3purge-e2e-test` unless the args already contain
    /// `--target-profile` or `--target-access-key`.
    pub fn build_config(args: Vec<&str>) -> Config {
        let mut full_args: Vec<String> = vec!["s3purge".to_string()];
        full_args.extend(args.iter().map(|s| s.to_string()));

        let has_profile = full_args.iter().any(|a| a.starts_with("--target-profile"));
        let has_access_key = full_args
            .iter()
            .any(|a| a.starts_with("--target-access-key"));
        if !has_profile && !has_access_key {
            full_args.push("--target-profile".to_string());
            full_args.push(AWS_PROFILE.to_string());
        }

        build_config_from_args(full_args)
            .unwrap_or_else(|e| panic!("Failed to build config from args: {e}"))
    }

    /// Run a purge with the given config.
    pub async fn run_purge(config: Config) -> Result<PurgeResult, PurgeFailure> {
        let token = create_purge_cancellation_token();
        let orchestrator = PurgeOrchestrator::new(config, token)
            .await
            .unwrap_or_else(|e| panic!("Failed to create orchestrator: {e}"));

        orchestrator.run().await
    }
}

/// Default timeout for E2E tests (5 minutes).
pub const E2E_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(300);

/// Wraps an async E2E test body with a timeout.
#[macro_export]
macro_rules! e2e_timeout {
    ($body:expr) => {
        tokio::time::timeout(common::E2E_TIMEOUT, $body)
            .await
            .expect("E2E test timed out")
    };
}
