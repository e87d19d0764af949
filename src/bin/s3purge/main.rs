use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing::{debug, trace};

use s3purge_rs::config::Config;
use s3purge_rs::{
    CLIArgs, EventType, LoggingEventCallback, PurgeOrchestrator, PurgeResult,
    create_purge_cancellation_token, exit_code_from_error,
};

mod shutdown;
mod tracing_init;

/// s3purge - Purge every object version and delete marker from a versioned Amazon S3 bucket.
///
/// This binary is a thin wrapper over the s3purge-rs library.
#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    let config = load_config_exit_if_err();

    if let Some(shell) = config.auto_complete_shell {
        generate(
            shell,
            &mut CLIArgs::command(),
            "s3purge",
            &mut std::io::stdout(),
        );

        return;
    }

    start_tracing_if_necessary(&config);

    trace!("config = {:?}", config);

    if let Err(e) = run(config).await {
        eprintln!("Error: {e}");
        std::process::exit(exit_code_from_error(&e));
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
fn load_config_exit_if_err() -> Config {
    match Config::try_from(CLIArgs::parse()) {
        Ok(config) => config,
        Err(error_message) => {
            clap::Error::raw(clap::error::ErrorKind::ValueValidation, error_message).exit()
        }
    }
}

fn start_tracing_if_necessary(config: &Config) -> bool {
    let Some(tracing_config) = config.tracing_config.as_ref() else {
        return false;
    };

    tracing_init::init_tracing(tracing_config);
    true
}

fn summary_line(bucket: &str, result: &PurgeResult) -> String {
    format!(
        "Purged {} versions of objects and {} object delete markers from s3://{}",
        result.deleted_versions, result.deleted_delete_markers, bucket
    )
}

async fn run(mut config: Config) -> Result<()> {
    config
        .event_manager
        .register_callback(EventType::ALL_EVENTS, LoggingEventCallback::new());

    let cancellation_token = create_purge_cancellation_token();
    shutdown::spawn_shutdown_watcher(cancellation_token.clone(), config.timeout);

    let bucket = config.bucket.clone();
    let start_time = tokio::time::Instant::now();
    debug!(bucket = bucket, "purge start.");

    let orchestrator = PurgeOrchestrator::new(config, cancellation_token).await?;
    let result = orchestrator.run().await;

    let duration_sec = format!("{:.3}", start_time.elapsed().as_secs_f32());

    match result {
        Ok(result) => {
            debug!(duration_sec = duration_sec, "s3purge has been completed.");
            println!("{}", summary_line(&bucket, &result));
            Ok(())
        }
        Err(failure) => {
            debug!(
                duration_sec = duration_sec,
                deleted_versions = failure.progress.deleted_versions,
                deleted_delete_markers = failure.progress.deleted_delete_markers,
                "s3purge failed."
            );
            Err(failure.into())
        }
    }
}
