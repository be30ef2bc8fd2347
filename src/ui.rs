//! UI rendering for the terminal deck.
//!
//! Everything here reads the [`App`] and draws it with `ratatui`. The only
//! thing handed back is where the transport buttons landed, so mouse events
//! can be hit-tested against the frame that was actually drawn.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph,
        Wrap,
    },
};
use std::time::Duration;

use crate::app::{App, InputMode, PlaybackState};
use crate::audio::MediaOutput;
use crate::config::UiSettings;
use crate::gesture;
use crate::library::IMPORTED_ATTRIBUTION;

const CONTROLS: &[(&str, &str)] = &[
    ("space/p", "play/pause"),
    ("h/l", "prev/next (hold to scrub)"),
    ("j/k", "up/down"),
    ("enter", "play selected"),
    ("i", "import tape"),
    ("d", "erase tape"),
    ("-/+", "volume"),
    ("[/]", "lo-fi"),
    ("q", "quit"),
];

const REEL_FRAMES: [&str; 4] = ["(|)", "(/)", "(-)", "(\\)"];

/// One of the three clickable transport buttons.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportButton {
    Rewind,
    PlayPause,
    FastForward,
}

impl TransportButton {
    /// The scrub direction behind a press-and-hold button.
    pub fn direction(self) -> Option<gesture::Direction> {
        match self {
            Self::Rewind => Some(gesture::Direction::Backward),
            Self::FastForward => Some(gesture::Direction::Forward),
            Self::PlayPause => None,
        }
    }
}

/// Screen areas of the transport buttons in the last drawn frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportHitboxes {
    pub rewind: Rect,
    pub play: Rect,
    pub fast_forward: Rect,
}

impl TransportHitboxes {
    pub fn hit(&self, column: u16, row: u16) -> Option<TransportButton> {
        let p = Position::new(column, row);
        if self.rewind.contains(p) {
            Some(TransportButton::Rewind)
        } else if self.play.contains(p) {
            Some(TransportButton::PlayPause)
        } else if self.fast_forward.contains(p) {
            Some(TransportButton::FastForward)
        } else {
            None
        }
    }
}

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn format_size(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{} KB", bytes.div_ceil(1024))
    }
}

/// Reel glyph for a tape position; turns four times a second of tape.
fn reel_frame(position: Duration, spinning: bool) -> &'static str {
    if !spinning {
        return REEL_FRAMES[0];
    }
    REEL_FRAMES[(position.as_millis() / 250 % REEL_FRAMES.len() as u128) as usize]
}

/// Split the transport row into rewind / play / fast-forward.
pub fn transport_layout(area: Rect) -> TransportHitboxes {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);
    TransportHitboxes {
        rewind: cols[0],
        play: cols[1],
        fast_forward: cols[2],
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

fn cassette_lines<O: MediaOutput>(app: &App<O>) -> Vec<Line<'static>> {
    let deck = &app.player.deck;
    let state = app.playback_state();
    let scrub = app.player.scrubbing();

    let (label, sub) = match app.now_playing() {
        Some((_, t)) => (t.name.clone(), t.attribution.clone()),
        None => (
            "NO TAPE INSERTED".to_string(),
            "WAITING FOR INPUT...".to_string(),
        ),
    };

    let spinning = state == PlaybackState::Playing || scrub.is_some();
    let position = deck.position();
    let reel = reel_frame(position, spinning);
    let reels = format!("{reel}   {}   {reel}", format_mmss(position));

    let mode = match scrub {
        Some(gesture::Direction::Forward) => format!(">> FAST_FORWARD x{:.1} >>", deck.rate()),
        Some(gesture::Direction::Backward) => "<< REWINDING <<".to_string(),
        None => match state {
            PlaybackState::Playing => "PLAYING".to_string(),
            PlaybackState::Paused => "PAUSED".to_string(),
            PlaybackState::Stopped => "STOPPED".to_string(),
        },
    };

    vec![
        Line::from(label).bold(),
        Line::from(sub).dim(),
        Line::from(reels),
        Line::from(mode).slow_blink(),
    ]
}

/// Bar heights for the spectrum panel, 0..=100.
fn spectrum_heights(levels: &[f32]) -> Vec<u64> {
    levels
        .iter()
        .map(|l| (l.clamp(0.0, 1.0) * 100.0).round() as u64)
        .collect()
}

fn draw_spectrum<O: MediaOutput>(frame: &mut Frame, app: &App<O>, area: Rect) {
    let bars: Vec<Bar> = spectrum_heights(app.player.deck.spectrum())
        .into_iter()
        .map(|h| {
            // Low bars magenta, loud ones cyan.
            let color = if h > 60 { Color::Cyan } else { Color::Magenta };
            Bar::default()
                .value(h)
                .style(Style::default().fg(color))
                .text_value(String::new())
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" spectrum "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
        .max(100);
    frame.render_widget(chart, area);
}

fn draw_transport<O: MediaOutput>(frame: &mut Frame, app: &App<O>, area: Rect) -> TransportHitboxes {
    let boxes = transport_layout(area);
    let scrub = app.player.scrubbing();
    let play_label = if app.player.deck.is_playing() {
        "❚❚"
    } else {
        "▶"
    };

    let button = |label: &str, held: bool| {
        let style = if held {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        Paragraph::new(label.to_string())
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::default().borders(Borders::ALL))
    };

    frame.render_widget(
        button("◀◀", scrub == Some(gesture::Direction::Backward)),
        boxes.rewind,
    );
    frame.render_widget(button(play_label, false), boxes.play);
    frame.render_widget(
        button("▶▶", scrub == Some(gesture::Direction::Forward)),
        boxes.fast_forward,
    );
    boxes
}

fn draw_tapes<O: MediaOutput>(frame: &mut Frame, app: &App<O>, area: Rect) {
    let playlist = &app.player.playlist;
    let current = playlist.cursor();

    // Window the list around the selection; only build items that are visible.
    let total = playlist.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel = app.selected.min(total.saturating_sub(1));
    let (start, end) = if total <= list_height || list_height == 0 {
        (0, total)
    } else {
        let half = list_height / 2;
        let mut start = sel.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height)
    };

    let items: Vec<ListItem> = playlist
        .iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .map(|(i, t)| {
            let now = if Some(i) == current { "▶" } else { " " };
            let mine = if t.attribution == IMPORTED_ATTRIBUTION {
                "*"
            } else {
                " "
            };
            ListItem::new(format!("{now}{mine} {}", t.name))
        })
        .collect();

    let title = match app.storage_usage() {
        Some((0, _)) | None => " tapes ".to_string(),
        Some((count, bytes)) => format!(" tapes (* = yours: {count}, {}) ", format_size(bytes)),
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if total > 0 {
        state.select(Some(sel - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_knobs<O: MediaOutput>(frame: &mut Frame, app: &App<O>, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let deck = &app.player.deck;
    let volume_label = if deck.is_muted() {
        "MUTED".to_string()
    } else {
        format!("{:.0}%", deck.volume() * 100.0)
    };
    let volume = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" volume "))
        .ratio(f64::from(deck.volume()).clamp(0.0, 1.0))
        .label(volume_label);
    let lofi = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" lo-fi "))
        .ratio(f64::from(deck.lofi()).clamp(0.0, 1.0))
        .label(format!("{:.0}%", deck.lofi() * 100.0));

    frame.render_widget(volume, halves[0]);
    frame.render_widget(lofi, halves[1]);
}

fn draw_popup<O: MediaOutput>(frame: &mut Frame, app: &App<O>, area: Rect) {
    let (title, body) = match &app.input {
        InputMode::Normal => return,
        InputMode::Import(buf) => (
            " import tape (enter to load, esc to cancel) ",
            format!("path: {buf}_"),
        ),
        InputMode::ConfirmDelete { name, .. } => (
            " erase tape ",
            format!("ERASE {name} FROM THE DECK? [y] yes / [n] no"),
        ),
    };

    let popup = centered_rect_sized(64, 3, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(body)
            .block(padded(title))
            .wrap(Wrap { trim: false }),
        popup,
    );
}

/// Render the whole deck. Returns where the transport buttons were drawn.
pub fn draw<O: MediaOutput>(frame: &mut Frame, app: &App<O>, ui: &UiSettings) -> TransportHitboxes {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" tapedeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    let cassette = Paragraph::new(cassette_lines(app))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" cassette "));
    frame.render_widget(cassette, top[0]);
    draw_spectrum(frame, app, top[1]);

    let hitboxes = draw_transport(frame, app, chunks[2]);
    draw_tapes(frame, app, chunks[3]);
    draw_knobs(frame, app, chunks[4]);

    let footer_text = match &app.player.status {
        Some(status) => format!("{status}\n{}", controls_text()),
        None => controls_text(),
    };
    let footer = Paragraph::new(footer_text)
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);

    draw_popup(frame, app, chunks[3]);
    hitboxes
}
