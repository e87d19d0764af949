// Stops a running purge on Ctrl+C or when the --timeout deadline passes.
//
// Both paths cancel the same token; the purge notices it before its next call.

use std::time::Duration;

use s3purge_rs::PurgeCancellationToken;
use tokio::task::JoinHandle;
use tokio::{select, signal};
use tracing::{debug, warn};

/// Spawn a task that cancels `cancellation_token` on Ctrl+C or after
/// `deadline`, whichever comes first.
///
/// The task exits quietly once the token is cancelled by anyone else.
pub fn spawn_shutdown_watcher(
    cancellation_token: PurgeCancellationToken,
    deadline: Option<Duration>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let deadline_elapsed = async {
            match deadline {
                Some(deadline) => tokio::time::sleep(deadline).await,
                None => std::future::pending().await,
            }
        };

        select! {
            biased;

            _ = cancellation_token.cancelled() => {
                debug!("cancellation_token canceled.");
            }
            _ = signal::ctrl_c() => {
                warn!("ctrl-c received, stopping the purge.");
                cancellation_token.cancel();
            }
            _ = deadline_elapsed => {
                warn!(timeout = ?deadline, "purge deadline exceeded, stopping the purge.");
                cancellation_token.cancel();
            }
        }
    })
}
