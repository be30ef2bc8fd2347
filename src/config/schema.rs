use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tapedeck/config.toml` or `~/.config/tapedeck/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TAPEDECK__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub transport: TransportSettings,
    pub library: LibrarySettings,
    pub storage: StorageSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial output volume, 0.0 to 1.0.
    pub volume: f32,
    /// Amount added or removed per volume key press.
    pub volume_step: f32,
    /// Initial lo-fi amount, 0.0 (clean) to 1.0 (muffled with hiss).
    pub lofi: f32,
    /// Amount added or removed per lo-fi key press.
    pub lofi_step: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            volume_step: 0.1,
            lofi: 0.0,
            lofi_step: 0.1,
        }
    }
}

/// Timing of the press-and-hold transport buttons.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// How long a button must be held before it turns into a scrub.
    pub press_threshold_ms: u64,
    /// Playback rate while fast-forwarding.
    pub fast_forward_rate: f32,
    /// How far each rewind tick moves the tape back (milliseconds).
    pub rewind_step_ms: u64,
    /// Interval between rewind ticks (milliseconds).
    pub rewind_tick_ms: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            press_threshold_ms: 300,
            fast_forward_rate: 3.0,
            rewind_step_ms: 500,
            rewind_tick_ms: 50,
        }
    }
}

impl TransportSettings {
    pub fn press_threshold(&self) -> Duration {
        Duration::from_millis(self.press_threshold_ms)
    }

    pub fn rewind_step(&self) -> Duration {
        Duration::from_millis(self.rewind_step_ms)
    }

    pub fn rewind_tick(&self) -> Duration {
        Duration::from_millis(self.rewind_tick_ms)
    }
}

/// Where the bundled (read-only) tapes come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory scanned for bundled tapes. The first command line argument wins over this.
    pub bundled_dir: Option<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            bundled_dir: None,
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding imported tapes. Defaults to the XDG data dir.
    pub dir: Option<PathBuf>,
    /// Optional cap on the total size of imported tapes, in megabytes.
    pub quota_mb: Option<u64>,
}

impl StorageSettings {
    pub fn quota_bytes(&self) -> Option<u64> {
        self.quota_mb.map(|mb| mb.saturating_mul(1024 * 1024))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ CYBER-DECK ~ insert tape, press play ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Log file path. Defaults to `tapedeck.log` in the data dir.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
