use std::time::Duration;

use crate::library::MediaRef;

use super::lofi::Tone;
use super::types::PlaybackError;

/// The platform media primitive behind a [`super::Deck`].
///
/// A freshly loaded tape starts paused at zero. Speed, volume and tone
/// settings persist across loads.
pub trait MediaOutput {
    fn load(&mut self, media: &MediaRef) -> Result<(), PlaybackError>;
    /// Drop the loaded tape, releasing its media.
    fn unload(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    fn set_speed(&mut self, speed: f32);
    fn set_volume(&mut self, volume: f32);
    fn set_tone(&mut self, tone: Tone);
    fn position(&self) -> Duration;
    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError>;
    /// True once the loaded tape has played to its end.
    fn is_finished(&self) -> bool;
    /// Replace `out` with the newest mono samples played, oldest first.
    /// Left empty when nothing new was played since the last call.
    fn take_recent_samples(&self, out: &mut Vec<f32>);
}
