//! Building `rodio` sinks for tapes.
//!
//! Every tape is decoded through a low-pass filter whose cutoff is read from a
//! shared atomic, so the lo-fi knob applies to the tape already playing. The
//! filtered signal is also copied into the spectrum ring.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::library::MediaRef;

use super::spectrum::{SampleRing, SampleTap};
use super::types::PlaybackError;

const TONE_REFRESH: Duration = Duration::from_millis(50);

/// Create a paused `Sink` for `media`, filtered at the shared `cutoff`.
pub(super) fn create_sink(
    stream: &OutputStream,
    media: &MediaRef,
    cutoff: Arc<AtomicU32>,
    ring: Arc<Mutex<SampleRing>>,
) -> Result<Sink, PlaybackError> {
    let sink = Sink::connect_new(stream.mixer());
    match media {
        MediaRef::File(path) => {
            let file = File::open(path)?;
            append_filtered(&sink, BufReader::new(file), cutoff, ring)?;
        }
        MediaRef::Stored(bytes) => {
            append_filtered(&sink, Cursor::new(Arc::clone(bytes)), cutoff, ring)?
        }
    }
    sink.pause();
    Ok(sink)
}

fn append_filtered<R>(
    sink: &Sink,
    reader: R,
    cutoff: Arc<AtomicU32>,
    ring: Arc<Mutex<SampleRing>>,
) -> Result<(), PlaybackError>
where
    R: Read + Seek + Send + Sync + 'static,
{
    let source = Decoder::new(reader)?;
    let initial = below_nyquist(cutoff.load(Ordering::Relaxed), source.sample_rate());
    let mut applied = initial;

    let filtered = source
        .low_pass(initial)
        .periodic_access(TONE_REFRESH, move |filter| {
            let wanted = below_nyquist(cutoff.load(Ordering::Relaxed), filter.sample_rate());
            if wanted != applied {
                filter.to_low_pass(wanted);
                applied = wanted;
            }
        });
    sink.append(SampleTap::new(filtered, ring));
    Ok(())
}

/// Keep the cutoff safely under half the sample rate.
fn below_nyquist(cutoff: u32, sample_rate: rodio::SampleRate) -> u32 {
    cutoff.min(sample_rate.saturating_mul(9) / 20).max(1)
}
