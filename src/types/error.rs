use thiserror::Error;

use crate::types::{DeletePhase, PurgeResult};

/// Boxed cause carried by provider-facing error variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application-level error types for s3purge-rs.
///
/// ## Exit Codes
///
/// Each variant maps to an exit code (via `exit_code()`):
/// - 1: Purge failures (List, Delete, Cancelled)
/// - 2: Configuration errors (InvalidConfig)
#[derive(Error, Debug)]
pub enum S3purgeError {
    /// A ListObjectVersions call failed (transport, auth, throttling or an
    /// in-flight cancellation).
    #[error("failed to list object versions: {cause}")]
    List {
        /// `source` with its whole context chain, so the S3 error code survives boxing.
        cause: String,
        #[source]
        source: BoxError,
    },

    /// A DeleteObjects call failed while purging `phase`.
    ///
    /// `deleted_before_failure` counts objects of the same call that earlier
    /// chunks had already removed. They are gone but not reflected in
    /// [`PurgeResult`].
    #[error("failed to delete {phase}: {cause}")]
    Delete {
        phase: DeletePhase,
        deleted_before_failure: usize,
        cause: String,
        #[source]
        source: BoxError,
    },

    /// The cancellation token fired before the next call was issued.
    #[error("purge cancelled")]
    Cancelled,

    /// Invalid configuration (non-retryable).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl S3purgeError {
    pub fn list(source: anyhow::Error) -> Self {
        S3purgeError::List {
            cause: format!("{source:#}"),
            source: source.into(),
        }
    }

    pub fn delete(phase: DeletePhase, deleted_before_failure: usize, source: anyhow::Error) -> Self {
        S3purgeError::Delete {
            phase,
            deleted_before_failure,
            cause: format!("{source:#}"),
            source: source.into(),
        }
    }

    /// The delete phase this error happened in, if it is a delete error.
    pub fn phase(&self) -> Option<DeletePhase> {
        match self {
            S3purgeError::Delete { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, S3purgeError::Cancelled)
    }

    /// Get the appropriate process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            S3purgeError::InvalidConfig(_) => 2,
            _ => 1,
        }
    }
}

/// A purge that stopped on its first error.
///
/// `progress` holds what was deleted before the failure, so callers can
/// report partial progress. Re-running the purge picks up where it stopped.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct PurgeFailure {
    pub progress: PurgeResult,
    #[source]
    pub error: S3purgeError,
}

impl PurgeFailure {
    pub fn new(progress: PurgeResult, error: S3purgeError) -> Self {
        Self { progress, error }
    }
}

/// Extract the exit code from an anyhow::Error, defaulting to 1.
pub fn exit_code_from_error(e: &anyhow::Error) -> i32 {
    if let Some(err) = e.downcast_ref::<S3purgeError>() {
        return err.exit_code();
    }
    if let Some(failure) = e.downcast_ref::<PurgeFailure>() {
        return failure.error.exit_code();
    }
    1
}
