use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Where the log goes: `log.file`, else `tapedeck.log` in the data dir.
pub fn log_path(settings: &Settings) -> Option<PathBuf> {
    settings
        .log
        .file
        .clone()
        .or_else(|| settings.data_dir().map(|d| d.join("tapedeck.log")))
}

/// Send `tracing` output to a file. The terminal belongs to the UI, so there
/// is no stderr fallback: without a usable path logging stays off.
pub fn init(settings: &Settings) -> Option<PathBuf> {
    let path = log_path(settings)?;
    if let Err(e) = open_and_install(&path, &settings.log.level) {
        eprintln!("tapedeck: logging disabled ({}): {e}", path.display());
        return None;
    }
    Some(path)
}

fn open_and_install(path: &Path, level: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let subscriber = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_target(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
