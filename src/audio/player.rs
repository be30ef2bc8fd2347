use std::time::Duration;

use crate::library::TrackDescriptor;

use super::lofi::Tone;
use super::output::MediaOutput;
use super::spectrum::{SPECTRUM_BANDS, SpectrumAnalyzer};
use super::types::PlaybackError;

/// Playback controller.
///
/// `playing` is what the user asked for. Scrubbing may run or halt the output
/// through [`Deck::resume_output`] / [`Deck::halt_output`] without touching it.
pub struct Deck<O: MediaOutput> {
    output: O,
    playing: bool,
    loaded: bool,
    rate: f32,
    volume: f32,
    muted: bool,
    lofi: f32,
    analyzer: SpectrumAnalyzer,
    bands: [f32; SPECTRUM_BANDS],
    heard: Vec<f32>,
}

impl<O: MediaOutput> Deck<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            playing: false,
            loaded: false,
            rate: 1.0,
            volume: 1.0,
            muted: false,
            lofi: 0.0,
            analyzer: SpectrumAnalyzer::new(),
            bands: [0.0; SPECTRUM_BANDS],
            heard: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &O {
        &self.output
    }

    #[cfg(test)]
    pub(crate) fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Load `track` (or eject when `None`). Keeps playing if the deck was playing.
    pub fn load_current(&mut self, track: Option<&TrackDescriptor>) -> Result<(), PlaybackError> {
        let Some(track) = track else {
            self.stop();
            return Ok(());
        };

        tracing::debug!(name = %track.name, media = ?track.media, "loading tape");
        match self.output.load(&track.media) {
            Ok(()) => {
                self.loaded = true;
                if self.playing {
                    self.output.play();
                }
                Ok(())
            }
            Err(e) => {
                self.loaded = false;
                Err(e)
            }
        }
    }

    pub fn play(&mut self) {
        self.playing = true;
        if self.loaded {
            self.output.play();
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.output.pause();
    }

    /// Flip play/pause. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
        self.playing
    }

    /// Halt and eject.
    pub fn stop(&mut self) {
        self.playing = false;
        self.loaded = false;
        self.output.unload();
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn resume_output(&mut self) {
        if self.loaded {
            self.output.play();
        }
    }

    pub fn halt_output(&mut self) {
        self.output.pause();
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
        self.output.set_speed(rate);
    }

    pub fn position(&self) -> Duration {
        if self.loaded {
            self.output.position()
        } else {
            Duration::ZERO
        }
    }

    pub fn seek_to(&mut self, position: Duration) -> Result<(), PlaybackError> {
        if !self.loaded {
            return Ok(());
        }
        self.output.seek(position)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_volume();
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_volume();
    }

    pub fn lofi(&self) -> f32 {
        self.lofi
    }

    pub fn set_lofi(&mut self, amount: f32) {
        self.lofi = amount.clamp(0.0, 1.0);
        self.output.set_tone(Tone::for_lofi(self.lofi));
    }

    /// The loaded tape ran out while the deck was playing.
    pub fn finished(&self) -> bool {
        self.loaded && self.playing && self.output.is_finished()
    }

    /// Band levels (0..=1) as of the last [`Deck::refresh_spectrum`].
    pub fn spectrum(&self) -> &[f32; SPECTRUM_BANDS] {
        &self.bands
    }

    /// Analyse what the output played since the last refresh.
    pub fn refresh_spectrum(&mut self) {
        self.output.take_recent_samples(&mut self.heard);
        self.bands = self.analyzer.analyze(&self.heard);
    }

    fn apply_volume(&mut self) {
        let effective = if self.muted { 0.0 } else { self.volume };
        self.output.set_volume(effective);
    }
}
