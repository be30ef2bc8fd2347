use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::library::MediaRef;

use super::lofi::{TapeHiss, Tone};
use super::output::MediaOutput;
use super::sink::create_sink;
use super::spectrum::SampleRing;
use super::types::PlaybackError;

const HISS_SAMPLE_RATE: rodio::SampleRate = 44_100;

/// [`MediaOutput`] on the default audio device.
pub struct RodioOutput {
    stream: OutputStream,
    sink: Option<Sink>,
    hiss: Sink,
    cutoff: Arc<AtomicU32>,
    ring: Arc<Mutex<SampleRing>>,
    speed: f32,
    volume: f32,
}

impl RodioOutput {
    pub fn open() -> Result<Self, PlaybackError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when OutputStream is dropped, which garbles the TUI.
        stream.log_on_drop(false);

        let hiss = Sink::connect_new(stream.mixer());
        hiss.set_volume(0.0);
        hiss.append(TapeHiss::new(HISS_SAMPLE_RATE));

        let tone = Tone::default();
        tracing::info!("audio output opened");
        Ok(Self {
            stream,
            sink: None,
            hiss,
            cutoff: Arc::new(AtomicU32::new(tone.cutoff_hz)),
            ring: SampleRing::shared(),
            speed: 1.0,
            volume: 1.0,
        })
    }
}

impl MediaOutput for RodioOutput {
    fn load(&mut self, media: &MediaRef) -> Result<(), PlaybackError> {
        self.unload();
        let sink = create_sink(
            &self.stream,
            media,
            Arc::clone(&self.cutoff),
            Arc::clone(&self.ring),
        )?;
        sink.set_speed(self.speed);
        sink.set_volume(self.volume);
        self.sink = Some(sink);
        Ok(())
    }

    fn unload(&mut self) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
    }

    fn play(&mut self) {
        if let Some(s) = &self.sink {
            s.play();
        }
    }

    fn pause(&mut self) {
        if let Some(s) = &self.sink {
            s.pause();
        }
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
        if let Some(s) = &self.sink {
            s.set_speed(speed);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = &self.sink {
            s.set_volume(volume);
        }
    }

    fn set_tone(&mut self, tone: Tone) {
        self.cutoff.store(tone.cutoff_hz, Ordering::Relaxed);
        self.hiss.set_volume(tone.hiss_gain);
    }

    fn position(&self) -> Duration {
        self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos)
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        match &self.sink {
            Some(s) => Ok(s.try_seek(position)?),
            None => Ok(()),
        }
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().is_some_and(Sink::empty)
    }

    fn take_recent_samples(&self, out: &mut Vec<f32>) {
        match self.ring.lock() {
            Ok(mut ring) => ring.take_into(out),
            Err(_) => out.clear(),
        }
    }
}
