pub mod args;

use std::time::Duration;

use aws_smithy_types::checksum_config::RequestChecksumCalculation;

use crate::callback::event_manager::EventManager;
use crate::types::{ClientConfigLocation, S3Credentials};

/// Largest `max_keys` S3 accepts for ListObjectVersions.
pub const MAX_KEYS_LIMIT: i32 = 1000;

/// Main configuration for a purge run.
///
/// Holds the target bucket, the listing page size, the optional deadline,
/// AWS client settings, tracing settings and the event observer.
///
/// # Quick Start
///
/// ```
/// use s3purge_rs::Config;
///
/// let config = Config::for_bucket("my-versioned-bucket");
/// assert_eq!(config.max_keys, 1000);
/// assert!(config.timeout.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub bucket: String,
    pub max_keys: i32,
    pub timeout: Option<Duration>,
    pub target_client_config: Option<ClientConfig>,
    pub tracing_config: Option<TracingConfig>,
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
    pub event_manager: EventManager,
}

impl Config {
    /// Create a `Config` with defaults for the given bucket.
    ///
    /// AWS credentials and region are resolved from the environment.
    pub fn for_bucket(bucket: &str) -> Self {
        Config {
            bucket: bucket.to_string(),
            target_client_config: Some(ClientConfig::default()),
            ..Config::default()
        }
    }
}

impl Default for Config {
    /// The `bucket` defaults to empty and no client is configured; set both
    /// before running a purge against S3.
    fn default() -> Self {
        Config {
            bucket: String::new(),
            max_keys: MAX_KEYS_LIMIT,
            timeout: None,
            target_client_config: None,
            tracing_config: None,
            auto_complete_shell: None,
            event_manager: EventManager::new(),
        }
    }
}

/// AWS S3 client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_config_location: ClientConfigLocation,
    pub credential: S3Credentials,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub retry_config: RetryConfig,
    pub cli_timeout_config: CLITimeoutConfig,
    pub disable_stalled_stream_protection: bool,
    pub request_checksum_calculation: RequestChecksumCalculation,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            client_config_location: ClientConfigLocation::default(),
            credential: S3Credentials::FromEnvironment,
            region: None,
            endpoint_url: None,
            force_path_style: false,
            retry_config: RetryConfig::default(),
            cli_timeout_config: CLITimeoutConfig::default(),
            disable_stalled_stream_protection: false,
            request_checksum_calculation: RequestChecksumCalculation::WhenRequired,
        }
    }
}

/// Retry configuration for AWS SDK operations.
///
/// These are transport-level retries inside the SDK. The purge loop itself
/// never retries a failed call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub aws_max_attempts: u32,
    pub initial_backoff_milliseconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            aws_max_attempts: 10,
            initial_backoff_milliseconds: 100,
        }
    }
}

/// Timeout configuration for AWS SDK operations.
#[derive(Debug, Clone, Default)]
pub struct CLITimeoutConfig {
    pub operation_timeout_milliseconds: Option<u64>,
    pub operation_attempt_timeout_milliseconds: Option<u64>,
    pub connect_timeout_milliseconds: Option<u64>,
    pub read_timeout_milliseconds: Option<u64>,
}

/// Tracing (logging) configuration.
#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub aws_sdk_tracing: bool,
    pub span_events_tracing: bool,
    pub disable_color_tracing: bool,
}
