use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

use zeroize_derive::{Zeroize, ZeroizeOnDrop};

pub mod error;
pub mod event_callback;
pub mod token;

/// One deletable unit in a versioned bucket: an object version or a delete marker.
///
/// Built by the storage adapter from a listing page and consumed read-only by
/// the [`BatchDeleter`](crate::deleter::BatchDeleter). Two refs are equal iff
/// both the key and the version id match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectVersionRef {
    key: String,
    version_id: String,
}

impl ObjectVersionRef {
    pub fn new(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: version_id.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }
}

/// Position in a ListObjectVersions listing.
///
/// S3 paginates version listings with two markers that are only meaningful
/// together, so they live in one value and are always replaced as a pair.
/// The markers are opaque: callers pass back exactly what a page returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationCursor {
    key_marker: Option<String>,
    version_id_marker: Option<String>,
}

impl PaginationCursor {
    /// The cursor that requests the first page.
    pub fn start() -> Self {
        Self::default()
    }

    /// Build a cursor from the `NextKeyMarker` / `NextVersionIdMarker` pair of a response.
    pub fn from_markers(key_marker: Option<String>, version_id_marker: Option<String>) -> Self {
        Self {
            key_marker,
            version_id_marker,
        }
    }

    pub fn key_marker(&self) -> Option<&str> {
        self.key_marker.as_deref()
    }

    pub fn version_id_marker(&self) -> Option<&str> {
        self.version_id_marker.as_deref()
    }

    /// True when both markers are absent.
    ///
    /// On input this means "start of listing"; on a returned page it means
    /// the provider reported no further pages.
    pub fn is_exhausted(&self) -> bool {
        self.key_marker.is_none() && self.version_id_marker.is_none()
    }
}

impl Display for PaginationCursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key_marker={}, version_id_marker={}",
            self.key_marker.as_deref().unwrap_or("-"),
            self.version_id_marker.as_deref().unwrap_or("-")
        )
    }
}

/// One page of a version listing, already split into the two entry kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub versions: Vec<ObjectVersionRef>,
    pub delete_markers: Vec<ObjectVersionRef>,
    pub next_cursor: PaginationCursor,
}

impl ListingPage {
    /// True when the page carries no entries and no continuation.
    ///
    /// This is the only condition under which a purge stops successfully.
    pub fn is_final(&self) -> bool {
        self.versions.is_empty() && self.delete_markers.is_empty() && self.next_cursor.is_exhausted()
    }
}

/// Which of the two entry kinds a delete call was working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePhase {
    Versions,
    DeleteMarkers,
}

impl Display for DeletePhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeletePhase::Versions => write!(f, "versions"),
            DeletePhase::DeleteMarkers => write!(f, "delete markers"),
        }
    }
}

/// Running totals of a purge.
///
/// Counters only grow, and only after the delete call for a whole sub-list
/// has succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeResult {
    pub deleted_versions: u64,
    pub deleted_delete_markers: u64,
}

impl PurgeResult {
    pub fn total(&self) -> u64 {
        self.deleted_versions + self.deleted_delete_markers
    }
}

/// AWS configuration file locations.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigLocation {
    pub aws_config_file: Option<PathBuf>,
    pub aws_shared_credentials_file: Option<PathBuf>,
}

/// How the S3 client resolves credentials.
#[derive(Debug, Clone)]
pub enum S3Credentials {
    Profile(String),
    Credentials { access_keys: AccessKeys },
    FromEnvironment,
}

/// AWS access key pair.
///
/// The secret_access_key and session_token are cleared from memory when this
/// struct is dropped, and never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessKeys {
    pub access_key: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Debug for AccessKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_struct("AccessKeys");
        let session_token = self
            .session_token
            .as_ref()
            .map_or("None", |_| "** redacted **");
        keys.field("access_key", &self.access_key)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &session_token);
        keys.finish()
    }
}
