//! Application model types: `App`, `InputMode` and `PlaybackState`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::audio::MediaOutput;
use crate::gesture::{Direction, GestureDispatcher};
use crate::library::{TrackDescriptor, tape_name_for};
use crate::playlist::PlaylistError;
use crate::store::{DeleteError, StorageError, TapeId, TrackStore};

use super::player::Player;

pub const MSG_INSERT_TAPE: &str = "INSERT TAPE FIRST";
pub const MSG_STORAGE_FAILED: &str = "STORAGE FULL OR ERROR: COULD NOT PERSIST TAPE";

/// The playback state of the application.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// What the keyboard is currently feeding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing the path of a file to import.
    Import(String),
    /// Waiting for the user to confirm erasing a tape.
    ConfirmDelete { index: usize, name: String },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("tape storage is unavailable")]
    StoreUnavailable,
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum EraseError {
    #[error("tape storage is unavailable")]
    StoreUnavailable,
    #[error(transparent)]
    Playlist(#[from] PlaylistError),
    /// The tape left the playlist but the store refused to delete it.
    #[error(transparent)]
    Store(#[from] DeleteError),
}

/// The main application model.
pub struct App<O: MediaOutput> {
    pub player: Player<O>,
    pub input: InputMode,
    /// Highlighted row of the tape list.
    pub selected: usize,
    store: Option<TrackStore>,
    gestures: GestureDispatcher,
}

impl<O: MediaOutput> App<O> {
    /// `store` is `None` when it failed to open; imports and erasing are then refused.
    pub fn new(player: Player<O>, store: Option<TrackStore>, gestures: GestureDispatcher) -> Self {
        let selected = player.playlist.cursor().unwrap_or(0);
        Self {
            player,
            input: InputMode::Normal,
            selected,
            store,
            gestures,
        }
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn playback_state(&self) -> PlaybackState {
        let deck = &self.player.deck;
        if !deck.is_loaded() {
            PlaybackState::Stopped
        } else if deck.is_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }

    /// Cursor index and descriptor of the current tape.
    pub fn now_playing(&self) -> Option<(usize, &TrackDescriptor)> {
        let playlist = &self.player.playlist;
        playlist.cursor().zip(playlist.current())
    }

    pub fn toggle_play(&mut self) {
        if self.player.playlist.is_empty() {
            self.player.set_status(MSG_INSERT_TAPE);
            return;
        }
        if !self.player.deck.is_loaded() && !self.player.load_current() {
            return;
        }
        self.player.deck.toggle();
    }

    pub fn play(&mut self) {
        if !self.player.deck.is_playing() {
            self.toggle_play();
        }
    }

    pub fn pause(&mut self) {
        self.player.deck.pause();
    }

    pub fn stop(&mut self) {
        self.player.deck.stop();
    }

    pub fn next_track(&mut self) {
        self.player.next_track();
        self.follow_cursor();
    }

    pub fn prev_track(&mut self) {
        self.player.prev_track();
        self.follow_cursor();
    }

    /// Move the list highlight down, wrapping.
    pub fn select_next(&mut self) {
        let len = self.player.playlist.len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the list highlight up, wrapping.
    pub fn select_prev(&mut self) {
        let len = self.player.playlist.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Load the highlighted tape and start playing it.
    pub fn play_selected(&mut self) {
        if self.player.select(self.selected) && self.player.deck.is_loaded() {
            self.player.deck.play();
        }
    }

    pub fn nudge_volume(&mut self, delta: f32) {
        let deck = &mut self.player.deck;
        deck.set_volume(deck.volume() + delta);
    }

    pub fn nudge_lofi(&mut self, delta: f32) {
        let deck = &mut self.player.deck;
        deck.set_lofi(deck.lofi() + delta);
    }

    /// Persist the file at `path` as a new tape, append it and start playing it.
    ///
    /// Nothing changes if reading or storing fails.
    pub fn import_tape(&mut self, path: &Path) -> Result<TapeId, ImportError> {
        let store = self.store.as_mut().ok_or(ImportError::StoreUnavailable)?;
        let bytes = std::fs::read(path).map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = tape_name_for(path);
        let id = store.add(&name, &bytes)?;

        tracing::info!(%id, name = %name, "tape imported");
        self.player.set_status(format!("TAPE PERSISTED: {name}"));

        self.player
            .playlist
            .append(TrackDescriptor::stored(id, name, bytes));
        let last = self.player.playlist.len() - 1;
        self.player.select(last);
        self.follow_cursor();
        if !self.player.deck.is_playing() && self.player.deck.is_loaded() {
            self.player.deck.play();
        }
        Ok(id)
    }

    /// Erase the tape at `index` from the playlist and the store.
    ///
    /// If the store refuses, the tape goes back where it was and playback is
    /// left alone.
    pub fn erase_tape(&mut self, index: usize) -> Result<TrackDescriptor, EraseError> {
        if self.store.is_none() {
            return Err(EraseError::StoreUnavailable);
        }
        let cursor_before = self.player.playlist.cursor();

        let removed = self.player.playlist.remove(index)?;
        if let (Some(id), Some(store)) = (removed.id, self.store.as_mut()) {
            if let Err(e) = store.delete(id) {
                self.player.playlist.insert(index, removed);
                if let Some(c) = cursor_before {
                    self.player.playlist.select(c);
                }
                return Err(e.into());
            }
        }

        // Anything at or before the cursor shifts what the cursor points at.
        if cursor_before.is_some_and(|c| index <= c) {
            self.player.load_current();
        }
        self.clamp_selection();
        tracing::info!(name = %removed.name, "tape erased");
        Ok(removed)
    }

    /// The path being typed into the import prompt.
    pub fn import_buffer_mut(&mut self) -> Option<&mut String> {
        match &mut self.input {
            InputMode::Import(buf) => Some(buf),
            _ => None,
        }
    }

    pub fn begin_import(&mut self) {
        if !self.has_store() {
            self.player.set_status("TAPE STORAGE UNAVAILABLE");
            return;
        }
        self.input = InputMode::Import(String::new());
    }

    /// Import the path typed into the prompt and leave input mode.
    pub fn submit_import(&mut self) {
        let InputMode::Import(buf) = std::mem::take(&mut self.input) else {
            return;
        };
        let path = buf.trim();
        if path.is_empty() {
            return;
        }
        if let Err(e) = self.import_tape(Path::new(path)) {
            tracing::warn!(error = %e, "import failed");
            let msg = match e {
                ImportError::Storage(_) => MSG_STORAGE_FAILED.to_string(),
                other => other.to_string().to_uppercase(),
            };
            self.player.set_status(msg);
        }
    }

    /// Ask to erase the current tape. Demo tapes are refused right away.
    pub fn request_delete(&mut self) {
        let Some((index, track)) = self.now_playing() else {
            self.player.set_status("NO TAPE INSERTED");
            return;
        };
        if !track.persisted {
            let msg = PlaylistError::Protected {
                name: track.name.clone(),
            }
            .to_string()
            .to_uppercase();
            self.player.set_status(msg);
            return;
        }
        if !self.has_store() {
            self.player.set_status("TAPE STORAGE UNAVAILABLE");
            return;
        }
        let name = track.name.clone();
        self.input = InputMode::ConfirmDelete { index, name };
    }

    pub fn confirm_delete(&mut self) {
        let InputMode::ConfirmDelete { index, name } = std::mem::take(&mut self.input) else {
            return;
        };
        match self.erase_tape(index) {
            Ok(_) => self.player.set_status(format!("TAPE ERASED: {name}")),
            Err(e) => {
                tracing::warn!(error = %e, "erase failed");
                self.player.set_status(e.to_string().to_uppercase());
            }
        }
    }

    pub fn cancel_input(&mut self) {
        self.input = InputMode::Normal;
    }

    /// Returns false when another press is already in progress.
    pub fn pointer_down(&mut self, now: Instant, direction: Direction) -> bool {
        self.gestures.pointer_down(now, direction)
    }

    pub fn pointer_up(&mut self, now: Instant, direction: Direction) {
        self.gestures.pointer_up(now, direction, &mut self.player);
        self.follow_cursor();
    }

    pub fn pointer_leave(&mut self, now: Instant, direction: Direction) {
        self.gestures.pointer_leave(now, direction, &mut self.player);
    }

    /// Number and total size of the stored tapes.
    pub fn storage_usage(&self) -> Option<(usize, u64)> {
        self.store.as_ref().map(|s| (s.len(), s.total_bytes()))
    }

    /// When [`App::tick`] next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.gestures.next_deadline()
    }

    /// Run due gesture timers and roll over to the next tape at the end of one.
    pub fn tick(&mut self, now: Instant) {
        self.gestures.advance(now, &mut self.player);
        self.player.deck.refresh_spectrum();
        if self.player.scrubbing().is_none() && self.player.deck.finished() {
            tracing::debug!("tape ended, advancing");
            self.next_track();
        }
    }

    fn follow_cursor(&mut self) {
        if let Some(c) = self.player.playlist.cursor() {
            self.selected = c;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.player.playlist.len();
        if self.selected >= len {
            self.selected = self.player.playlist.cursor().unwrap_or(0);
        }
    }
}
