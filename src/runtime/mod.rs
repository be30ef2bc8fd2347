use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::audio::RodioOutput;
use crate::mpris::ControlCmd;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();
    let log_file = logging::init(&settings);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), log = ?log_file, "tapedeck starting");
    if let Some(problem) = config_problem {
        tracing::warn!("{problem}");
    }

    // The first argument names the bundled tape directory and wins over the config.
    let bundled_dir = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| settings.library.bundled_dir.clone());

    let output = RodioOutput::open()?;
    let mut app = startup::build_app(&settings, bundled_dir.as_deref(), output);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    // Key release events let h/l be held like the on-screen buttons.
    let key_release = matches!(supports_keyboard_enhancement(), Ok(true));
    if key_release {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    tracing::debug!(key_release, "terminal ready");

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::new(key_release);
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mpris,
        &control_rx,
        &mut state,
    );

    disable_raw_mode()?;
    if key_release {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &run_result {
        tracing::error!(error = %e, "event loop failed");
    }
    tracing::info!("tapedeck stopped");
    run_result
}
