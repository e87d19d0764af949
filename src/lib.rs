/*!
# Overview
s3purge-rs empties a versioning-enabled Amazon S3 bucket: it deletes every
version of every object and every delete marker, so the bucket itself can be
removed. This cannot be undone.

## How it works
- Walks the bucket's ListObjectVersions listing page by page, following the
  key / version-id marker pair.
- Deletes each page's versions and delete markers as separate DeleteObjects
  batches of at most 1000 entries.
- Stops at the first failed call and reports how much had been deleted
  before it. Running the purge again continues where it stopped.

## As a Library
The s3purge CLI is a thin wrapper over this library.

```toml
[dependencies]
s3purge-rs = "0.1"
tokio = { version = "1", features = ["full"] }
```

```no_run
use s3purge_rs::config::args::parse_from_args;
use s3purge_rs::{Config, PurgeOrchestrator, create_purge_cancellation_token};

#[tokio::main]
async fn main() {
    let args = vec!["s3purge", "s3://my-versioned-bucket", "--max-keys", "500"];

    let parsed_args = parse_from_args(args).unwrap();
    let config = Config::try_from(parsed_args).unwrap();
    let cancellation_token = create_purge_cancellation_token();
    let orchestrator = PurgeOrchestrator::new(config, cancellation_token)
        .await
        .unwrap();

    match orchestrator.run().await {
        Ok(result) => println!(
            "deleted {} versions and {} delete markers",
            result.deleted_versions, result.deleted_delete_markers
        ),
        Err(failure) => eprintln!("Error: {failure}"),
    }
}
```
*/

pub mod callback;
pub mod config;
pub mod deleter;
pub mod lister;
pub mod orchestrator;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use callback::event_manager::EventManager;
pub use callback::logging_event_callback::LoggingEventCallback;
pub use config::Config;
pub use config::args::{CLIArgs, build_config_from_args, parse_from_args};
pub use orchestrator::PurgeOrchestrator;
pub use types::error::{PurgeFailure, S3purgeError, exit_code_from_error};
pub use types::event_callback::{EventCallback, EventData, EventType};
pub use types::token::{PurgeCancellationToken, create_purge_cancellation_token};
pub use types::{ObjectVersionRef, PaginationCursor, PurgeResult};
