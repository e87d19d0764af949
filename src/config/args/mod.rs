use crate::callback::event_manager::EventManager;
use crate::config::{
    CLITimeoutConfig, ClientConfig, Config, MAX_KEYS_LIMIT, RetryConfig, TracingConfig,
};
use crate::types::{AccessKeys, ClientConfigLocation, S3Credentials};
use aws_smithy_types::checksum_config::RequestChecksumCalculation;
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;


// ---------------------------------------------------------------------------
// Default constants
// ---------------------------------------------------------------------------

const DEFAULT_MAX_KEYS: i32 = MAX_KEYS_LIMIT;
const DEFAULT_AWS_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_INITIAL_BACKOFF_MILLISECONDS: u64 = 100;
const DEFAULT_JSON_TRACING: bool = false;
const DEFAULT_AWS_SDK_TRACING: bool = false;
const DEFAULT_SPAN_EVENTS_TRACING: bool = false;
const DEFAULT_DISABLE_COLOR_TRACING: bool = false;
const DEFAULT_FORCE_PATH_STYLE: bool = false;
const DEFAULT_DISABLE_STALLED_STREAM_PROTECTION: bool = false;

const S3_SCHEME: &str = "s3://";

// ---------------------------------------------------------------------------
// Error messages
// ---------------------------------------------------------------------------

const ERROR_MESSAGE_INVALID_BUCKET: &str =
    "Bucket must be a bucket name or 's3://<BUCKET_NAME>' without a prefix.";
const ERROR_MESSAGE_INVALID_TIMEOUT: &str =
    "Timeout must be a duration such as '30s', '5m' or '1h 30m'";

// ---------------------------------------------------------------------------
// Value parser helpers
// ---------------------------------------------------------------------------

/// Accepts `my-bucket`, `s3://my-bucket` and `s3://my-bucket/`.
fn check_bucket(s: &str) -> Result<String, String> {
    let bucket = s.strip_prefix(S3_SCHEME).unwrap_or(s);
    let bucket = bucket.strip_suffix('/').unwrap_or(bucket);

    if bucket.is_empty() || bucket.contains('/') {
        return Err(ERROR_MESSAGE_INVALID_BUCKET.to_string());
    }
    Ok(bucket.to_string())
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim()).map_err(|e| format!("{ERROR_MESSAGE_INVALID_TIMEOUT}: {e}"))
}

// ---------------------------------------------------------------------------
// CLIArgs (clap-derived argument struct)
// ---------------------------------------------------------------------------

/// s3purge - Purge every object version and delete marker from a versioned Amazon S3 bucket.
///
/// The bucket is left empty so it can be deleted. This cannot be undone.
///
/// Example:
///   s3purge my-versioned-bucket
///   s3purge s3://my-versioned-bucket --max-keys 500 --timeout 30m
///   s3purge my-versioned-bucket -q
#[derive(Parser, Clone, Debug)]
#[command(name = "s3purge", version, about, long_about = None)]
pub struct CLIArgs {
    /// Bucket to purge: <BUCKET_NAME> or s3://<BUCKET_NAME>
    #[arg(
        env = "S3PURGE_BUCKET",
        help = "<BUCKET_NAME> or s3://<BUCKET_NAME>",
        value_parser = check_bucket,
        default_value_if("auto_complete_shell", clap::builder::ArgPredicate::IsPresent, "ignored"),
        required = false,
    )]
    pub bucket: String,

    // -----------------------------------------------------------------------
    // General options
    // -----------------------------------------------------------------------
    /// Max keys per ListObjectVersions request (1-1000).
    #[arg(
        long,
        env = "S3PURGE_MAX_KEYS",
        default_value_t = DEFAULT_MAX_KEYS,
        value_parser = clap::value_parser!(i32).range(1..=MAX_KEYS_LIMIT as i64),
        help_heading = "General"
    )]
    pub max_keys: i32,

    /// Deadline for the whole purge, e.g. 30s, 5m, 1h. Zero means no deadline.
    #[arg(
        long,
        env = "S3PURGE_TIMEOUT",
        value_parser = parse_timeout,
        help_heading = "General"
    )]
    pub timeout: Option<Duration>,

    // -----------------------------------------------------------------------
    // Logging options
    // -----------------------------------------------------------------------
    /// Verbosity level. -q (quiet, no progress), default (progress), -v, -vv.
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Output logs in JSON format.
    #[arg(long, env, default_value_t = DEFAULT_JSON_TRACING, help_heading = "Logging")]
    pub json_tracing: bool,

    /// Enable AWS SDK tracing.
    #[arg(long, env, default_value_t = DEFAULT_AWS_SDK_TRACING, help_heading = "Logging")]
    pub aws_sdk_tracing: bool,

    /// Enable tracing span events.
    #[arg(long, env, default_value_t = DEFAULT_SPAN_EVENTS_TRACING, help_heading = "Logging")]
    pub span_events_tracing: bool,

    /// Disable colored output in logs.
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_COLOR_TRACING, help_heading = "Logging")]
    pub disable_color_tracing: bool,

    // -----------------------------------------------------------------------
    // Retry options
    // -----------------------------------------------------------------------
    /// Maximum attempts per AWS SDK call (SDK-level retry).
    #[arg(long, env, default_value_t = DEFAULT_AWS_MAX_ATTEMPTS, help_heading = "Retry")]
    pub aws_max_attempts: u32,

    /// Initial backoff in milliseconds for SDK retries.
    #[arg(long, env, default_value_t = DEFAULT_INITIAL_BACKOFF_MILLISECONDS, help_heading = "Retry")]
    pub initial_backoff_milliseconds: u64,

    // -----------------------------------------------------------------------
    // Timeout options
    // -----------------------------------------------------------------------
    /// Per-operation timeout in milliseconds.
    #[arg(long, env, help_heading = "Timeout")]
    pub operation_timeout_milliseconds: Option<u64>,

    /// Per-attempt operation timeout in milliseconds.
    #[arg(long, env, help_heading = "Timeout")]
    pub operation_attempt_timeout_milliseconds: Option<u64>,

    /// Connection timeout in milliseconds.
    #[arg(long, env, help_heading = "Timeout")]
    pub connect_timeout_milliseconds: Option<u64>,

    /// Read timeout in milliseconds.
    #[arg(long, env, help_heading = "Timeout")]
    pub read_timeout_milliseconds: Option<u64>,

    // -----------------------------------------------------------------------
    // AWS configuration
    // -----------------------------------------------------------------------
    /// AWS config file path.
    #[arg(long, env, help_heading = "AWS")]
    pub aws_config_file: Option<PathBuf>,

    /// AWS shared credentials file path.
    #[arg(long, env, help_heading = "AWS")]
    pub aws_shared_credentials_file: Option<PathBuf>,

    /// AWS profile. If not set, uses the default credential chain.
    #[arg(
        long,
        env,
        value_parser = NonEmptyStringValueParser::new(),
        conflicts_with = "target_access_key",
        help_heading = "AWS"
    )]
    pub target_profile: Option<String>,

    /// AWS access key ID.
    #[arg(
        long,
        env,
        value_parser = NonEmptyStringValueParser::new(),
        requires = "target_secret_access_key",
        help_heading = "AWS"
    )]
    pub target_access_key: Option<String>,

    /// AWS secret access key.
    #[arg(
        long,
        env,
        value_parser = NonEmptyStringValueParser::new(),
        requires = "target_access_key",
        help_heading = "AWS"
    )]
    pub target_secret_access_key: Option<String>,

    /// AWS session token.
    #[arg(
        long,
        env,
        value_parser = NonEmptyStringValueParser::new(),
        requires = "target_access_key",
        help_heading = "AWS"
    )]
    pub target_session_token: Option<String>,

    /// AWS region.
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub target_region: Option<String>,

    /// Custom S3-compatible endpoint URL (e.g. MinIO, Wasabi).
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub target_endpoint_url: Option<String>,

    /// Force path-style access (required for some S3-compatible services).
    #[arg(long, env, default_value_t = DEFAULT_FORCE_PATH_STYLE, help_heading = "AWS")]
    pub target_force_path_style: bool,

    /// Disable stalled stream protection.
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_STALLED_STREAM_PROTECTION, help_heading = "AWS")]
    pub disable_stalled_stream_protection: bool,

    // -----------------------------------------------------------------------
    // Advanced options
    // -----------------------------------------------------------------------
    /// Generate shell completions.
    #[arg(long, env, help_heading = "Advanced")]
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

// ---------------------------------------------------------------------------
// parse_from_args (public API)
// ---------------------------------------------------------------------------

/// Parse command-line arguments into a `CLIArgs` struct.
///
/// # Example
///
/// ```
/// use s3purge_rs::config::args::parse_from_args;
///
/// let args = vec!["s3purge", "my-bucket", "--max-keys", "500"];
/// let cli_args = parse_from_args(args).unwrap();
/// assert_eq!(cli_args.bucket, "my-bucket");
/// assert_eq!(cli_args.max_keys, 500);
/// ```
pub fn parse_from_args<I, T>(args: I) -> Result<CLIArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CLIArgs::try_parse_from(args)
}

/// Parse arguments and build a Config in one step.
pub fn build_config_from_args<I, T>(args: I) -> Result<Config, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli_args = CLIArgs::try_parse_from(args).map_err(|e| e.to_string())?;
    Config::try_from(cli_args)
}

// ---------------------------------------------------------------------------
// Config conversion
// ---------------------------------------------------------------------------

impl CLIArgs {
    fn build_client_config(&self) -> ClientConfig {
        let credential = if let Some(ref profile) = self.target_profile {
            S3Credentials::Profile(profile.clone())
        } else if let (Some(access_key), Some(secret_access_key)) =
            (&self.target_access_key, &self.target_secret_access_key)
        {
            S3Credentials::Credentials {
                access_keys: AccessKeys {
                    access_key: access_key.clone(),
                    secret_access_key: secret_access_key.clone(),
                    session_token: self.target_session_token.clone(),
                },
            }
        } else {
            S3Credentials::FromEnvironment
        };

        ClientConfig {
            client_config_location: ClientConfigLocation {
                aws_config_file: self.aws_config_file.clone(),
                aws_shared_credentials_file: self.aws_shared_credentials_file.clone(),
            },
            credential,
            region: self.target_region.clone(),
            endpoint_url: self.target_endpoint_url.clone(),
            force_path_style: self.target_force_path_style,
            retry_config: RetryConfig {
                aws_max_attempts: self.aws_max_attempts,
                initial_backoff_milliseconds: self.initial_backoff_milliseconds,
            },
            cli_timeout_config: CLITimeoutConfig {
                operation_timeout_milliseconds: self.operation_timeout_milliseconds,
                operation_attempt_timeout_milliseconds: self.operation_attempt_timeout_milliseconds,
                connect_timeout_milliseconds: self.connect_timeout_milliseconds,
                read_timeout_milliseconds: self.read_timeout_milliseconds,
            },
            disable_stalled_stream_protection: self.disable_stalled_stream_protection,
            request_checksum_calculation: RequestChecksumCalculation::WhenRequired,
        }
    }

    fn build_tracing_config(&self) -> Option<TracingConfig> {
        let log_level = self.verbosity.log_level()?;

        Some(TracingConfig {
            tracing_level: log_level,
            json_tracing: self.json_tracing,
            aws_sdk_tracing: self.aws_sdk_tracing,
            span_events_tracing: self.span_events_tracing,
            disable_color_tracing: self.disable_color_tracing,
        })
    }
}

impl TryFrom<CLIArgs> for Config {
    type Error = String;

    fn try_from(args: CLIArgs) -> Result<Self, Self::Error> {
        // clap already enforces this range; the check guards direct struct construction.
        if !(1..=MAX_KEYS_LIMIT).contains(&args.max_keys) {
            return Err(format!(
                "max-keys must be between 1 and {MAX_KEYS_LIMIT}: {}",
                args.max_keys
            ));
        }

        Ok(Config {
            bucket: args.bucket.clone(),
            max_keys: args.max_keys,
            timeout: args.timeout.filter(|timeout| !timeout.is_zero()),
            target_client_config: Some(args.build_client_config()),
            tracing_config: args.build_tracing_config(),
            auto_complete_shell: args.auto_complete_shell,
            event_manager: EventManager::new(),
        })
    }
}
