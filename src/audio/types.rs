//! Playback errors as shown to the user.

use std::io;

use thiserror::Error;

/// Why a tape could not be played. Mirrors the coded reasons of a media element.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackErrorKind {
    Aborted,
    Network,
    Decode,
    Unsupported,
    Unknown,
}

impl PlaybackErrorKind {
    /// Short upper-case label for the status line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Aborted => "ABORTED",
            Self::Network => "NETWORK ERROR",
            Self::Decode => "DECODE ERROR",
            Self::Unsupported => "SRC NOT SUPPORTED",
            Self::Unknown => "LOAD ERROR",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}: {detail}", kind.label())]
pub struct PlaybackError {
    pub kind: PlaybackErrorKind,
    pub detail: String,
}

impl PlaybackError {
    pub fn new(kind: PlaybackErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl From<io::Error> for PlaybackError {
    fn from(e: io::Error) -> Self {
        // The locator could not be fetched.
        Self::new(PlaybackErrorKind::Network, e.to_string())
    }
}

impl From<rodio::decoder::DecoderError> for PlaybackError {
    fn from(e: rodio::decoder::DecoderError) -> Self {
        let kind = match e {
            rodio::decoder::DecoderError::UnrecognizedFormat => PlaybackErrorKind::Unsupported,
            _ => PlaybackErrorKind::Decode,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<rodio::source::SeekError> for PlaybackError {
    fn from(e: rodio::source::SeekError) -> Self {
        Self::new(PlaybackErrorKind::Unknown, e.to_string())
    }
}

impl From<rodio::StreamError> for PlaybackError {
    fn from(e: rodio::StreamError) -> Self {
        Self::new(PlaybackErrorKind::Aborted, e.to_string())
    }
}
