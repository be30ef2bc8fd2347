use std::ops::ControlFlow;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, InputMode};
use crate::audio::MediaOutput;
use crate::config::Settings;
use crate::gesture::Direction;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::MprisSync;
use crate::ui::{self, TransportButton, TransportHitboxes};

/// Upper bound on how long the loop sleeps; keeps the reels and clock moving.
const FRAME: Duration = Duration::from_millis(50);

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Where the transport buttons were drawn last frame.
    pub hitboxes: TransportHitboxes,
    /// Transport button the mouse went down on and has not released.
    held: Option<TransportButton>,
    /// Direction of an accepted h/l press still waiting for its release.
    key_held: Option<Direction>,
    /// Whether the terminal reports key releases, so h/l can be held.
    key_release: bool,
    mpris: MprisSync,
}

impl EventLoopState {
    pub fn new(key_release: bool) -> Self {
        Self {
            hitboxes: TransportHitboxes::default(),
            held: None,
            key_held: None,
            key_release,
            mpris: MprisSync::default(),
        }
    }
}

/// How long to wait for input: until the next gesture timer, capped at one frame.
fn poll_timeout(now: Instant, deadline: Option<Instant>) -> Duration {
    deadline.map_or(FRAME, |d| d.saturating_duration_since(now).min(FRAME))
}

pub fn run<O: MediaOutput>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &Settings,
    app: &mut App<O>,
    mpris: &MprisHandle,
    control_rx: &Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.tick(Instant::now());
        state.mpris.update(mpris, app);

        let mut hitboxes = state.hitboxes;
        terminal.draw(|f| hitboxes = ui::draw(f, app, &settings.ui))?;
        state.hitboxes = hitboxes;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control(app, cmd).is_break() {
                return Ok(());
            }
        }

        if !event::poll(poll_timeout(Instant::now(), app.next_deadline()))? {
            continue;
        }
        let flow = match event::read()? {
            Event::Key(key) => handle_key(app, settings, state, key),
            Event::Mouse(mouse) => {
                handle_mouse(app, state, mouse);
                ControlFlow::Continue(())
            }
            _ => ControlFlow::Continue(()),
        };
        if flow.is_break() {
            return Ok(());
        }
    }
}

fn handle_control<O: MediaOutput>(app: &mut App<O>, cmd: ControlCmd) -> ControlFlow<()> {
    tracing::debug!(?cmd, "mpris command");
    match cmd {
        ControlCmd::Quit => return ControlFlow::Break(()),
        ControlCmd::Play => app.play(),
        ControlCmd::Pause => app.pause(),
        ControlCmd::PlayPause => app.toggle_play(),
        ControlCmd::Stop => app.stop(),
        ControlCmd::Next => app.next_track(),
        ControlCmd::Prev => app.prev_track(),
    }
    ControlFlow::Continue(())
}

fn handle_key<O: MediaOutput>(
    app: &mut App<O>,
    settings: &Settings,
    state: &mut EventLoopState,
    key: KeyEvent,
) -> ControlFlow<()> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return ControlFlow::Break(());
    }

    // h/l stand in for the transport buttons: press and release map straight onto them.
    let transport = match key.code {
        KeyCode::Char('h') | KeyCode::Left => Some(Direction::Backward),
        KeyCode::Char('l') | KeyCode::Right => Some(Direction::Forward),
        _ => None,
    };
    if let (Some(direction), InputMode::Normal) = (transport, &app.input) {
        let now = Instant::now();
        match key.kind {
            KeyEventKind::Press if state.key_release => {
                if app.pointer_down(now, direction) {
                    state.key_held = Some(direction);
                }
            }
            KeyEventKind::Press => {
                // No release events from this terminal: every press is a short one.
                if app.pointer_down(now, direction) {
                    app.pointer_up(now, direction);
                }
            }
            KeyEventKind::Release => {
                if state.key_held == Some(direction) {
                    state.key_held = None;
                    app.pointer_up(now, direction);
                }
            }
            KeyEventKind::Repeat => {}
        }
        return ControlFlow::Continue(());
    }

    if key.kind == KeyEventKind::Release {
        return ControlFlow::Continue(());
    }

    match app.input {
        InputMode::Import(_) => match key.code {
            KeyCode::Enter => app.submit_import(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => {
                if let Some(buf) = app.import_buffer_mut() {
                    buf.pop();
                }
            }
            KeyCode::Char(c) if !c.is_control() => {
                if let Some(buf) = app.import_buffer_mut() {
                    buf.push(c);
                }
            }
            _ => {}
        },
        InputMode::ConfirmDelete { .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
            _ => app.cancel_input(),
        },
        InputMode::Normal => {
            let audio = &settings.audio;
            match key.code {
                KeyCode::Char('q') => return ControlFlow::Break(()),
                KeyCode::Char(' ') | KeyCode::Char('p') => app.toggle_play(),
                KeyCode::Char('i') => app.begin_import(),
                KeyCode::Char('d') => app.request_delete(),
                KeyCode::Char('+') | KeyCode::Char('=') => app.nudge_volume(audio.volume_step),
                KeyCode::Char('-') => app.nudge_volume(-audio.volume_step),
                KeyCode::Char(']') => app.nudge_lofi(audio.lofi_step),
                KeyCode::Char('[') => app.nudge_lofi(-audio.lofi_step),
                KeyCode::Char('j') | KeyCode::Down => app.select_next(),
                KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
                KeyCode::Enter => app.play_selected(),
                _ => {}
            }
        }
    }
    ControlFlow::Continue(())
}

fn handle_mouse<O: MediaOutput>(app: &mut App<O>, state: &mut EventLoopState, mouse: MouseEvent) {
    let now = Instant::now();
    let over = state.hitboxes.hit(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => match over {
            Some(TransportButton::PlayPause) => app.toggle_play(),
            Some(button) => {
                // A press the dispatcher ignored must not end someone else's session.
                let accepted = button
                    .direction()
                    .is_some_and(|direction| app.pointer_down(now, direction));
                if accepted {
                    state.held = Some(button);
                }
            }
            None => {}
        },
        MouseEventKind::Drag(MouseButton::Left) => {
            let Some(held) = state.held else {
                return;
            };
            if over != Some(held) {
                if let Some(direction) = held.direction() {
                    app.pointer_leave(now, direction);
                }
                state.held = None;
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let Some(direction) = state.held.take().and_then(TransportButton::direction) else {
                return;
            };
            if over.and_then(TransportButton::direction) == Some(direction) {
                app.pointer_up(now, direction);
            } else {
                app.pointer_leave(now, direction);
            }
        }
        _ => {}
    }
}
