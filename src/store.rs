//! Durable storage for imported tapes.
//!
//! Layout under the store directory:
//!
//! * `tapes.toml`: the index, holding the next id to hand out and one entry per tape
//!   (`id`, `name`, `created_at`).
//! * `blobs/<id>.tape`: the raw audio bytes of each tape.
//!
//! Ids are handed out monotonically and never reused. The index is always
//! rewritten through a temporary file and a rename so a crash leaves either
//! the old or the new index, never a torn one.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const INDEX_FILE: &str = "tapes.toml";
const BLOB_DIR: &str = "blobs";

/// Identifier assigned by the store to an imported tape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TapeId(pub u64);

impl fmt::Display for TapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tape as read back from storage.
#[derive(Debug, Clone)]
pub struct PersistedTapeRecord {
    pub id: TapeId,
    pub name: String,
    pub bytes: Vec<u8>,
    /// Unix timestamp in milliseconds.
    pub created_at: u64,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: u64, available: u64 },
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("tape index is corrupt: {0}")]
    Corrupt(#[from] toml::de::Error),
    #[error("could not encode tape index: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("no stored tape with id {0}")]
    NotFound(TapeId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    id: TapeId,
    name: String,
    created_at: u64,
    size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Index {
    next_id: u64,
    #[serde(default)]
    tapes: Vec<IndexEntry>,
}

impl Default for Index {
    fn default() -> Self {
        Self {
            next_id: 1,
            tapes: Vec::new(),
        }
    }
}

/// File-backed tape store. Holding a `TrackStore` means the index has been
/// loaded and the directories exist.
#[derive(Debug)]
pub struct TrackStore {
    root: PathBuf,
    index: Index,
    quota: Option<u64>,
}

impl TrackStore {
    /// Open (or create) the store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, quota: Option<u64>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(root.join(BLOB_DIR))?;

        let index = match fs::read_to_string(root.join(INDEX_FILE)) {
            Ok(text) => toml::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Index::default(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(root = %root.display(), tapes = index.tapes.len(), "tape store ready");
        Ok(Self { root, index, quota })
    }

    pub fn len(&self) -> usize {
        self.index.tapes.len()
    }

    /// Sum of the sizes of all stored tapes.
    pub fn total_bytes(&self) -> u64 {
        self.index.tapes.iter().map(|t| t.size).sum()
    }

    /// Persist a new tape and return its id.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<TapeId, StorageError> {
        let size = bytes.len() as u64;
        if let Some(quota) = self.quota {
            let available = quota.saturating_sub(self.total_bytes());
            if size > available {
                return Err(StorageError::QuotaExceeded {
                    needed: size,
                    available,
                });
            }
        }

        let id = TapeId(self.index.next_id);
        let blob = self.blob_path(id);
        write_atomic(&blob, bytes)?;

        let mut next = self.index.clone();
        next.next_id += 1;
        next.tapes.push(IndexEntry {
            id,
            name: name.to_string(),
            created_at: now_millis(),
            size,
        });

        if let Err(e) = self.write_index(&next) {
            // Abort: drop the orphaned blob, keep the old index.
            let _ = fs::remove_file(&blob);
            return Err(e);
        }
        self.index = next;

        tracing::info!(%id, name, size, "tape persisted");
        Ok(id)
    }

    /// Read every stored tape. Entries whose blob went missing are skipped.
    pub fn list(&self) -> Result<Vec<PersistedTapeRecord>, StorageError> {
        let mut records = Vec::with_capacity(self.index.tapes.len());
        for entry in &self.index.tapes {
            match fs::read(self.blob_path(entry.id)) {
                Ok(bytes) => records.push(PersistedTapeRecord {
                    id: entry.id,
                    name: entry.name.clone(),
                    bytes,
                    created_at: entry.created_at,
                }),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::warn!(id = %entry.id, name = %entry.name, "tape blob missing, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(records)
    }

    /// Remove a stored tape. Deleting an unknown id is an error.
    pub fn delete(&mut self, id: TapeId) -> Result<(), DeleteError> {
        let Some(pos) = self.index.tapes.iter().position(|t| t.id == id) else {
            return Err(DeleteError::NotFound(id));
        };

        let mut next = self.index.clone();
        next.tapes.remove(pos);
        self.write_index(&next)?;
        self.index = next;

        match fs::remove_file(self.blob_path(id)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(%id, error = %e, "failed to remove tape blob"),
        }

        tracing::info!(%id, "tape erased");
        Ok(())
    }

    fn blob_path(&self, id: TapeId) -> PathBuf {
        self.root.join(BLOB_DIR).join(format!("{}.tape", id.0))
    }

    fn write_index(&self, index: &Index) -> Result<(), StorageError> {
        let text = toml::to_string_pretty(index)?;
        write_atomic(&self.root.join(INDEX_FILE), text.as_bytes())?;
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(&tmp, path)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
