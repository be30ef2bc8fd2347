//! Recording [`MediaOutput`] for tests.

use std::cell::RefCell;
use std::time::Duration;

use crate::library::MediaRef;

use super::lofi::Tone;
use super::output::MediaOutput;
use super::types::{PlaybackError, PlaybackErrorKind};

#[derive(Debug)]
pub(crate) struct FakeOutput {
    pub loaded: Option<MediaRef>,
    pub loads: usize,
    pub running: bool,
    pub speed: f32,
    pub volume: f32,
    pub tone: Tone,
    pub position: Duration,
    pub finished: bool,
    /// Handed out (and emptied) by the next `take_recent_samples`.
    pub recent: RefCell<Vec<f32>>,
    /// Make the next `load` fail with this kind.
    pub fail_next_load: Option<PlaybackErrorKind>,
}

impl Default for FakeOutput {
    fn default() -> Self {
        Self {
            loaded: None,
            loads: 0,
            running: false,
            speed: 1.0,
            volume: 1.0,
            tone: Tone::default(),
            position: Duration::ZERO,
            finished: false,
            recent: RefCell::default(),
            fail_next_load: None,
        }
    }
}

impl MediaOutput for FakeOutput {
    fn load(&mut self, media: &MediaRef) -> Result<(), PlaybackError> {
        self.unload();
        if let Some(kind) = self.fail_next_load.take() {
            return Err(PlaybackError::new(kind, "fake failure"));
        }
        self.loaded = Some(media.clone());
        self.loads += 1;
        Ok(())
    }

    fn unload(&mut self) {
        self.loaded = None;
        self.running = false;
        self.position = Duration::ZERO;
        self.finished = false;
    }

    fn play(&mut self) {
        if self.loaded.is_some() {
            self.running = true;
        }
    }

    fn pause(&mut self) {
        self.running = false;
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        self.position = position;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn take_recent_samples(&self, out: &mut Vec<f32>) {
        out.clear();
        out.append(&mut self.recent.borrow_mut());
    }
}
