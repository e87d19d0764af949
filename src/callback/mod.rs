//! Callback management for a purge run.
//!
//! Provides the event callback manager and the stock logging callback.

pub mod event_manager;
pub mod logging_event_callback;
