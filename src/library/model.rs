use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::store::{PersistedTapeRecord, TapeId};

/// Label shown under bundled tapes.
pub const BUNDLED_ATTRIBUTION: &str = "LOCAL_TAPE";
/// Label shown under tapes the user imported.
pub const IMPORTED_ATTRIBUTION: &str = "USER_IMPORT";

/// Where the audio for a tape can be read from during this session.
///
/// Stored bytes are shared with whatever sink is currently playing them and
/// are freed once the last holder is dropped.
#[derive(Clone)]
pub enum MediaRef {
    File(PathBuf),
    Stored(Arc<[u8]>),
}

impl fmt::Debug for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(p) => f.debug_tuple("File").field(p).finish(),
            Self::Stored(bytes) => write!(f, "Stored({} bytes)", bytes.len()),
        }
    }
}

/// One entry of the playlist.
#[derive(Debug, Clone)]
pub struct TrackDescriptor {
    /// Store id; only present for persisted tapes.
    pub id: Option<TapeId>,
    pub name: String,
    pub attribution: String,
    pub media: MediaRef,
    pub persisted: bool,
}

impl TrackDescriptor {
    /// A read-only tape that ships with the deck.
    pub fn bundled(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            id: None,
            name: name.into(),
            attribution: BUNDLED_ATTRIBUTION.to_string(),
            media: MediaRef::File(path),
            persisted: false,
        }
    }

    /// A tape backed by a store record. Takes ownership of the record bytes.
    pub fn persisted(record: PersistedTapeRecord) -> Self {
        Self::stored(record.id, record.name, record.bytes)
    }

    /// A tape whose bytes were just written to the store under `id`.
    pub fn stored(id: TapeId, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            attribution: IMPORTED_ATTRIBUTION.to_string(),
            media: MediaRef::Stored(Arc::from(bytes)),
            persisted: true,
        }
    }
}

/// Derive a tape name from an imported file path: the file stem, upper-cased.
pub fn tape_name_for(path: &std::path::Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("UNTITLED")
        .to_uppercase()
}
