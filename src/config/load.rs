use std::{env, path::PathBuf};

use super::schema::Settings;

/// Longest transport timing accepted, one minute.
const MAX_TRANSPORT_MS: u64 = 60_000;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `TAPEDECK__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TAPEDECK")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let t = &self.transport;
        for (key, ms) in [
            ("press_threshold_ms", t.press_threshold_ms),
            ("rewind_tick_ms", t.rewind_tick_ms),
            ("rewind_step_ms", t.rewind_step_ms),
        ] {
            if !(1..=MAX_TRANSPORT_MS).contains(&ms) {
                return Err(format!(
                    "transport.{key} must be within 1..={MAX_TRANSPORT_MS}"
                ));
            }
        }
        if !(t.fast_forward_rate > 0.0) {
            return Err("transport.fast_forward_rate must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err("audio.volume must be within 0.0..=1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.audio.lofi) {
            return Err("audio.lofi must be within 0.0..=1.0".to_string());
        }
        Ok(())
    }

    /// Directory for imported tapes and the log file.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage.dir.clone().or_else(default_data_dir)
    }
}

/// Resolve the config path from `TAPEDECK_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TAPEDECK_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/tapedeck/config.toml`
/// or `~/.config/tapedeck/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("tapedeck").join("config.toml"))
}

/// `$XDG_DATA_HOME/tapedeck` or `~/.local/share/tapedeck`.
pub fn default_data_dir() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
    };

    data_home.map(|d| d.join("tapedeck"))
}
