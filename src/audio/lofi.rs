//! The lo-fi knob: a low-pass sweep plus tape hiss.

use std::time::Duration;

use rodio::Source;

const OPEN_CUTOFF_HZ: f32 = 20_000.0;
const CUTOFF_SWEEP_HZ: f32 = 19_200.0;
const MAX_HISS_GAIN: f32 = 0.05;

/// Filter and hiss settings derived from a lo-fi amount.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tone {
    pub cutoff_hz: u32,
    pub hiss_gain: f32,
}

impl Tone {
    /// `amount` 0.0 is a clean signal, 1.0 is an 800 Hz low-pass with audible hiss.
    pub fn for_lofi(amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        Self {
            cutoff_hz: (OPEN_CUTOFF_HZ - amount * CUTOFF_SWEEP_HZ).round() as u32,
            hiss_gain: amount * MAX_HISS_GAIN,
        }
    }
}

impl Default for Tone {
    fn default() -> Self {
        Self::for_lofi(0.0)
    }
}

/// Endless mono white noise.
pub(super) struct TapeHiss {
    sample_rate: rodio::SampleRate,
}

impl TapeHiss {
    pub(super) fn new(sample_rate: rodio::SampleRate) -> Self {
        Self { sample_rate }
    }
}

impl Iterator for TapeHiss {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        Some(rand::random::<f32>() * 2.0 - 1.0)
    }
}

impl Source for TapeHiss {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> rodio::ChannelCount {
        1
    }

    fn sample_rate(&self) -> rodio::SampleRate {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
