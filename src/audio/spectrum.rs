//! Spectrum display: a tap on the decoded tape and an FFT over what it caught.
//!
//! The tap sits at the end of the tape's source chain, so the lo-fi filter
//! shows up in the bars. Levels follow the usual analyser conventions: a
//! 256-point Hann-windowed FFT, magnitudes smoothed over time and mapped from
//! -100..-30 dB onto 0..1.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::Source;
use rodio::source::SeekError;
use rustfft::{Fft, FftPlanner, num_complex::Complex};

pub const FFT_SIZE: usize = 256;
pub const SPECTRUM_BANDS: usize = 32;

const BINS: usize = FFT_SIZE / 2;
const BINS_PER_BAND: usize = BINS / SPECTRUM_BANDS;
const SMOOTHING: f32 = 0.8;
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;
/// Mono frames collected before taking the lock.
const FLUSH_FRAMES: usize = 128;

/// The newest mono samples heard, shared between the audio thread and the UI.
#[derive(Debug, Default)]
pub struct SampleRing {
    samples: VecDeque<f32>,
    /// Set when samples arrive, cleared by [`SampleRing::take_into`].
    fresh: bool,
}

impl SampleRing {
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }

    fn extend(&mut self, frames: &[f32]) {
        self.samples.extend(frames.iter().copied());
        let excess = self.samples.len().saturating_sub(FFT_SIZE);
        self.samples.drain(..excess);
        self.fresh = true;
    }

    /// Copy the last window into `out`, or leave it empty when nothing was
    /// played since the previous call.
    pub fn take_into(&mut self, out: &mut Vec<f32>) {
        out.clear();
        if std::mem::take(&mut self.fresh) {
            out.extend(self.samples.iter().copied());
        }
    }
}

/// Passes samples through unchanged while copying a mono mix into a [`SampleRing`].
pub struct SampleTap<S> {
    inner: S,
    ring: Arc<Mutex<SampleRing>>,
    frame_sum: f32,
    frame_pos: u16,
    pending: Vec<f32>,
}

impl<S: Source> SampleTap<S> {
    pub fn new(inner: S, ring: Arc<Mutex<SampleRing>>) -> Self {
        Self {
            inner,
            ring,
            frame_sum: 0.0,
            frame_pos: 0,
            pending: Vec::with_capacity(FLUSH_FRAMES),
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        // The UI never holds the lock for long; dropping a batch is fine.
        if let Ok(mut ring) = self.ring.try_lock() {
            ring.extend(&self.pending);
        }
        self.pending.clear();
    }
}

impl<S: Source> Iterator for SampleTap<S> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let Some(sample) = self.inner.next() else {
            self.flush();
            return None;
        };
        let channels = self.inner.channels().max(1);
        self.frame_sum += sample;
        self.frame_pos += 1;
        if self.frame_pos >= channels {
            self.pending.push(self.frame_sum / f32::from(channels));
            self.frame_sum = 0.0;
            self.frame_pos = 0;
            if self.pending.len() >= FLUSH_FRAMES {
                self.flush();
            }
        }
        Some(sample)
    }
}

impl<S: Source> Source for SampleTap<S> {
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> rodio::ChannelCount {
        self.inner.channels()
    }

    fn sample_rate(&self) -> rodio::SampleRate {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.frame_sum = 0.0;
        self.frame_pos = 0;
        self.pending.clear();
        self.inner.try_seek(pos)
    }
}

/// Turns windows of samples into band levels in 0..=1.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: [f32; BINS],
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let window = (0..FFT_SIZE)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32).cos())
            })
            .collect();
        Self {
            fft: planner.plan_fft_forward(FFT_SIZE),
            window,
            buffer: vec![Complex::default(); FFT_SIZE],
            smoothed: [0.0; BINS],
        }
    }

    /// Analyse the newest samples. Fewer than [`FFT_SIZE`] samples are padded
    /// with silence in front, so an idle deck decays to flat.
    pub fn analyze(&mut self, samples: &[f32]) -> [f32; SPECTRUM_BANDS] {
        let recent = &samples[samples.len().saturating_sub(FFT_SIZE)..];
        let pad = FFT_SIZE - recent.len();
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let s = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = 1.0 / FFT_SIZE as f32;
        for (level, c) in self.smoothed.iter_mut().zip(&self.buffer) {
            *level = SMOOTHING * *level + (1.0 - SMOOTHING) * c.norm() * scale;
        }

        let mut bands = [0.0; SPECTRUM_BANDS];
        for (band, bins) in bands.iter_mut().zip(self.smoothed.chunks(BINS_PER_BAND)) {
            let peak = bins.iter().copied().fold(0.0f32, f32::max);
            *band = to_level(peak);
        }
        bands
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_level(magnitude: f32) -> f32 {
    if magnitude <= 0.0 {
        return 0.0;
    }
    let db = 20.0 * magnitude.log10();
    ((db - MIN_DB) / (MAX_DB - MIN_DB)).clamp(0.0, 1.0)
}
