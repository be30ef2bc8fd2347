use std::time::Duration;

use crate::audio::{Deck, MediaOutput};
use crate::gesture::{Direction, TransportControl};
use crate::playlist::Playlist;

/// Playlist plus deck: everything a transport button can act on.
pub struct Player<O: MediaOutput> {
    pub playlist: Playlist,
    pub deck: Deck<O>,
    /// One-line message for the user (errors, confirmations).
    pub status: Option<String>,
    scrub: Option<Direction>,
}

impl<O: MediaOutput> Player<O> {
    pub fn new(playlist: Playlist, deck: Deck<O>) -> Self {
        Self {
            playlist,
            deck,
            status: None,
            scrub: None,
        }
    }

    /// Direction of the scrub shown on the display, if any.
    pub fn scrubbing(&self) -> Option<Direction> {
        self.scrub
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    /// Load whatever the cursor points at. A playback error goes to the status
    /// line; returns whether a tape is now loaded.
    pub fn load_current(&mut self) -> bool {
        match self.deck.load_current(self.playlist.current()) {
            Ok(()) => self.deck.is_loaded(),
            Err(e) => {
                let name = self
                    .playlist
                    .current()
                    .map_or("UNKNOWN", |t| t.name.as_str());
                tracing::warn!(tape = name, error = %e, "playback error");
                self.status = Some(format!("{}: {}", e.kind.label(), name));
                false
            }
        }
    }

    pub fn next_track(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        self.playlist.next();
        self.load_current();
    }

    pub fn prev_track(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        self.playlist.prev();
        self.load_current();
    }

    /// Make `index` current and load it.
    pub fn select(&mut self, index: usize) -> bool {
        if !self.playlist.select(index) {
            return false;
        }
        self.load_current();
        true
    }
}

impl<O: MediaOutput> TransportControl for Player<O> {
    fn skip(&mut self, direction: Direction) {
        match direction {
            Direction::Forward => self.next_track(),
            Direction::Backward => self.prev_track(),
        }
    }

    fn has_track(&self) -> bool {
        self.playlist.current().is_some() && self.deck.is_loaded()
    }

    fn is_playing(&self) -> bool {
        self.deck.is_playing()
    }

    fn position(&self) -> Duration {
        self.deck.position()
    }

    fn seek_to(&mut self, position: Duration) {
        if let Err(e) = self.deck.seek_to(position) {
            tracing::warn!(error = %e, "seek failed");
        }
    }

    fn set_rate(&mut self, rate: f32) {
        self.deck.set_rate(rate);
    }

    fn set_muted(&mut self, muted: bool) {
        self.deck.set_muted(muted);
    }

    fn start_output(&mut self) {
        self.deck.resume_output();
    }

    fn stop_output(&mut self) {
        self.deck.halt_output();
    }

    fn scrub_changed(&mut self, scrub: Option<Direction>) {
        self.scrub = scrub;
    }
}
