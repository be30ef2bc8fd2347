//! The tape playlist: an ordered list of descriptors and a wrapping cursor.

use thiserror::Error;

use crate::library::TrackDescriptor;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaylistError {
    /// Bundled tapes cannot be erased.
    #[error("tape \"{name}\" is a demo tape and cannot be erased")]
    Protected { name: String },
    #[error("no tape at position {index} (playlist holds {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Ordered tapes plus the current position.
///
/// Invariant: `cursor` is `Some(i)` with `i < tracks.len()` whenever the
/// playlist is non-empty, and `None` when it is empty.
#[derive(Debug, Default)]
pub struct Playlist {
    tracks: Vec<TrackDescriptor>,
    cursor: Option<usize>,
}

impl Playlist {
    pub fn new(tracks: Vec<TrackDescriptor>) -> Self {
        let cursor = if tracks.is_empty() { None } else { Some(0) };
        Self { tracks, cursor }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.tracks.iter()
    }

    pub fn current(&self) -> Option<&TrackDescriptor> {
        self.cursor.and_then(|c| self.tracks.get(c))
    }

    /// Add a tape at the end. The first tape becomes current.
    pub fn append(&mut self, track: TrackDescriptor) {
        self.tracks.push(track);
        if self.cursor.is_none() {
            self.cursor = Some(0);
        }
    }

    /// Put `track` back at `index` (clamped to the end). The cursor keeps
    /// pointing at the same tape; an empty playlist's cursor lands on it.
    pub fn insert(&mut self, index: usize, track: TrackDescriptor) {
        let index = index.min(self.tracks.len());
        self.tracks.insert(index, track);
        self.cursor = match self.cursor {
            None => Some(index),
            Some(c) if index <= c => Some(c + 1),
            other => other,
        };
    }

    /// Move the cursor to `index`. Returns false if there is no such tape.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.cursor = Some(index);
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) {
        let len = self.tracks.len();
        if let Some(c) = self.cursor.filter(|_| len > 0) {
            self.cursor = Some((c + 1) % len);
        }
    }

    pub fn prev(&mut self) {
        let len = self.tracks.len();
        if let Some(c) = self.cursor.filter(|_| len > 0) {
            self.cursor = Some((c + len - 1) % len);
        }
    }

    /// Erase the tape at `index`. Only persisted tapes can be removed.
    ///
    /// The cursor is left alone unless it falls off the end, in which case it
    /// wraps to the first tape; an emptied playlist has no cursor.
    pub fn remove(&mut self, index: usize) -> Result<TrackDescriptor, PlaylistError> {
        let len = self.tracks.len();
        let target = self
            .tracks
            .get(index)
            .ok_or(PlaylistError::OutOfRange { index, len })?;
        if !target.persisted {
            return Err(PlaylistError::Protected {
                name: target.name.clone(),
            });
        }

        let removed = self.tracks.remove(index);
        self.cursor = match self.cursor {
            _ if self.tracks.is_empty() => None,
            Some(c) if index <= c && c >= self.tracks.len() => Some(0),
            other => other,
        };
        Ok(removed)
    }
}

#[cfg(test)]
mod tests;
