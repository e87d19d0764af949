/// A cancellation token observed by every list and delete call of a purge.
///
/// This is a type alias for [`tokio_util::sync::CancellationToken`]. Pass the
/// token to [`PurgeOrchestrator::new`](crate::PurgeOrchestrator::new) and call
/// [`cancel()`](tokio_util::sync::CancellationToken::cancel) on it to stop a
/// running purge (e.g., from a Ctrl+C handler or a deadline).
pub type PurgeCancellationToken = tokio_util::sync::CancellationToken;

/// Create a new [`PurgeCancellationToken`].
///
/// # Example
///
/// ```
/// use s3purge_rs::create_purge_cancellation_token;
///
/// let token = create_purge_cancellation_token();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
pub fn create_purge_cancellation_token() -> PurgeCancellationToken {
    tokio_util::sync::CancellationToken::new()
}
