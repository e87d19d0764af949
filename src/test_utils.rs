//! Shared test utilities for the s3purge library crate.
//!
//! Provides a scripted in-memory [`StorageTrait`] implementation and an event
//! collector used across the lister, deleter and orchestrator tests.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::storage::{Storage, StorageTrait};
use crate::types::event_callback::{EventCallback, EventData};
use crate::types::{ListingPage, ObjectVersionRef, PaginationCursor};

/// Initialise a dummy tracing subscriber for tests.
///
/// Uses `try_init` so that only the first call in a process actually
/// installs the subscriber; subsequent calls are silently ignored.
pub(crate) fn init_dummy_tracing_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dummy=trace")
        .try_init();
}

/// `count` refs named `{prefix}{index}` with version id `v{index}`.
pub(crate) fn make_refs(prefix: &str, count: usize) -> Vec<ObjectVersionRef> {
    (0..count)
        .map(|i| ObjectVersionRef::new(format!("{prefix}{i}"), format!("v{i}")))
        .collect()
}

/// A page with `versions` and `delete_markers` entries and the given next markers.
pub(crate) fn make_page(
    versions: usize,
    delete_markers: usize,
    next_key_marker: Option<&str>,
    next_version_id_marker: Option<&str>,
) -> ListingPage {
    ListingPage {
        versions: make_refs("version-", versions),
        delete_markers: make_refs("marker-", delete_markers),
        next_cursor: PaginationCursor::from_markers(
            next_key_marker.map(String::from),
            next_version_id_marker.map(String::from),
        ),
    }
}

/// Scripted result for one `list_object_versions` call.
#[derive(Debug, Clone)]
pub(crate) enum ListStep {
    Page(ListingPage),
    Fail(String),
}

#[derive(Debug, Default)]
struct MockState {
    list_script: VecDeque<ListStep>,
    list_calls: Vec<(PaginationCursor, i32)>,
    delete_calls: Vec<Vec<ObjectVersionRef>>,
    fail_delete_call: Option<usize>,
}

/// In-memory storage driven by a script of list results.
///
/// Once the script runs out every further listing returns an empty final
/// page. Delete calls succeed unless `fail_delete_on_call` selected one.
/// Clones share state, so the test keeps a handle after boxing a clone.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockStorage {
    state: Arc<Mutex<MockState>>,
}

impl MockStorage {
    pub(crate) fn new(list_script: Vec<ListStep>) -> Self {
        let state = MockState {
            list_script: list_script.into(),
            ..MockState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Mock whose listing returns `pages` in order.
    pub(crate) fn with_pages(pages: Vec<ListingPage>) -> Self {
        Self::new(pages.into_iter().map(ListStep::Page).collect())
    }

    /// Fail the delete call with this zero-based index (counted across all phases).
    pub(crate) async fn fail_delete_on_call(&self, call_index: usize) {
        self.state.lock().await.fail_delete_call = Some(call_index);
    }

    pub(crate) fn boxed(&self) -> Storage {
        Box::new(self.clone())
    }

    pub(crate) async fn list_calls(&self) -> Vec<(PaginationCursor, i32)> {
        self.state.lock().await.list_calls.clone()
    }

    pub(crate) async fn delete_calls(&self) -> Vec<Vec<ObjectVersionRef>> {
        self.state.lock().await.delete_calls.clone()
    }
}

#[async_trait]
impl StorageTrait for MockStorage {
    async fn list_object_versions(
        &self,
        cursor: &PaginationCursor,
        max_keys: i32,
    ) -> Result<ListingPage> {
        let mut state = self.state.lock().await;
        state.list_calls.push((cursor.clone(), max_keys));

        match state.list_script.pop_front() {
            Some(ListStep::Page(page)) => Ok(page),
            Some(ListStep::Fail(message)) => Err(anyhow!(message)),
            None => Ok(ListingPage::default()),
        }
    }

    async fn delete_objects(&self, objects: &[ObjectVersionRef]) -> Result<()> {
        let mut state = self.state.lock().await;
        let call_index = state.delete_calls.len();
        state.delete_calls.push(objects.to_vec());

        if state.fail_delete_call == Some(call_index) {
            return Err(anyhow!("injected DeleteObjects failure"));
        }
        Ok(())
    }
}

/// Event callback that stores every event it receives.
pub(crate) struct CollectingCallback {
    events: Arc<Mutex<Vec<EventData>>>,
}

impl CollectingCallback {
    pub(crate) fn new() -> (Self, Arc<Mutex<Vec<EventData>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: Arc::clone(&events),
            },
            events,
        )
    }
}

#[async_trait]
impl EventCallback for CollectingCallback {
    async fn on_event(&mut self, event_data: EventData) {
        self.events.lock().await.push(event_data);
    }
}
