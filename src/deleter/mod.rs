//! Deletion components for s3purge-rs.
//!
//! A purge deletes each page's object versions and delete markers as two
//! separate `BatchDeleter::delete_all` calls. Inputs larger than the S3
//! DeleteObjects limit are split into consecutive chunks.

pub mod batch;

pub use batch::{BatchDeleter, MAX_BATCH_SIZE};
