//! Audio side of the deck.
//!
//! [`Deck`] is the playback controller the rest of the app talks to. It keeps
//! the user's play/pause intent, volume, mute and lo-fi amount, and forwards
//! the actual work to a [`MediaOutput`]: [`RodioOutput`] in the app, a
//! recording fake in tests.

mod lofi;
mod output;
mod player;
mod rodio_out;
mod sink;
mod spectrum;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use output::MediaOutput;
pub use player::Deck;
pub use rodio_out::RodioOutput;

#[cfg(test)]
mod tests;
