//! Press-and-hold transport buttons.
//!
//! A press on ◀◀ / ▶▶ that is released before the threshold skips a tape in
//! that direction. Holding past the threshold scrubs instead: forward plays
//! fast and audible, backward rewinds silently in fixed steps until the tape
//! reaches zero. Releasing (or sliding off the button) ends the scrub and puts
//! the deck back the way it was.
//!
//! All time is passed in by the caller, and the dispatcher owns every timer it
//! starts. Each way out of a session goes through [`GestureDispatcher::end_session`],
//! which cancels whatever timers the session still holds.

use std::time::{Duration, Instant};

use crate::config::TransportSettings;
use crate::timer::{Scheduler, TimerToken};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// What the dispatcher drives. Implemented by the app's player.
pub trait TransportControl {
    /// Short press: move to the next/previous tape.
    fn skip(&mut self, direction: Direction);
    /// Whether there is a tape loaded to scrub through.
    fn has_track(&self) -> bool;
    /// Whether the user has the deck playing (not whether audio is audible).
    fn is_playing(&self) -> bool;
    fn position(&self) -> Duration;
    fn seek_to(&mut self, position: Duration);
    fn set_rate(&mut self, rate: f32);
    fn set_muted(&mut self, muted: bool);
    /// Run the output without changing the user's play/pause choice.
    fn start_output(&mut self);
    /// Halt the output without changing the user's play/pause choice.
    fn stop_output(&mut self);
    /// Scrub display hint; `None` restores the normal display.
    fn scrub_changed(&mut self, _scrub: Option<Direction>) {}
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GestureConfig {
    pub press_threshold: Duration,
    pub fast_forward_rate: f32,
    pub rewind_step: Duration,
    pub rewind_tick: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::from(&TransportSettings::default())
    }
}

impl From<&TransportSettings> for GestureConfig {
    fn from(s: &TransportSettings) -> Self {
        Self {
            press_threshold: s.press_threshold(),
            fast_forward_rate: s.fast_forward_rate,
            rewind_step: s.rewind_step(),
            rewind_tick: s.rewind_tick(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum TimerEvent {
    LongPress { session: u64 },
    RewindTick { session: u64 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Phase {
    /// Button down, threshold not reached yet.
    Pressed,
    /// Long press in progress. Remembers whether the deck was playing before.
    Scrubbing { was_playing: bool },
    /// Long press whose scrub already ended; the release does nothing.
    Spent,
}

#[derive(Debug)]
struct GestureSession {
    id: u64,
    direction: Direction,
    started_at: Instant,
    phase: Phase,
    press_timer: Option<TimerToken>,
    scrub_timer: Option<TimerToken>,
}

#[derive(Debug)]
pub struct GestureDispatcher {
    config: GestureConfig,
    timers: Scheduler<TimerEvent>,
    session: Option<GestureSession>,
    next_session: u64,
}

impl GestureDispatcher {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            timers: Scheduler::default(),
            session: None,
            next_session: 0,
        }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Direction of the scrub in progress, if any.
    #[cfg(test)]
    pub fn scrubbing(&self) -> Option<Direction> {
        self.session
            .as_ref()
            .filter(|s| matches!(s.phase, Phase::Scrubbing { .. }))
            .map(|s| s.direction)
    }

    /// When the caller should call [`Self::advance`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    #[cfg(test)]
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Button pressed. Ignored while another press is in progress.
    pub fn pointer_down(&mut self, now: Instant, direction: Direction) -> bool {
        if let Some(active) = &self.session {
            tracing::debug!(?direction, active = ?active.direction, "press ignored, session active");
            return false;
        }

        let id = self.next_session;
        self.next_session += 1;
        let press_timer = self.timers.once(
            now,
            self.config.press_threshold,
            TimerEvent::LongPress { session: id },
        );
        self.session = Some(GestureSession {
            id,
            direction,
            started_at: now,
            phase: Phase::Pressed,
            press_timer: Some(press_timer),
            scrub_timer: None,
        });
        true
    }

    /// Button released over the button: skip on a short press, end a scrub on a long one.
    pub fn pointer_up(&mut self, now: Instant, direction: Direction, t: &mut impl TransportControl) {
        self.release(now, direction, true, t);
    }

    /// Pointer slid off the button: like a release, but a short press is abandoned.
    pub fn pointer_leave(
        &mut self,
        now: Instant,
        direction: Direction,
        t: &mut impl TransportControl,
    ) {
        self.release(now, direction, false, t);
    }

    /// Run every timer due at `now`.
    pub fn advance(&mut self, now: Instant, t: &mut impl TransportControl) {
        while let Some(event) = self.timers.pop_due(now) {
            match event {
                TimerEvent::LongPress { session } if self.is_current(session) => {
                    self.begin_scrub(now, t);
                }
                TimerEvent::RewindTick { session } if self.is_current(session) => {
                    self.rewind_tick(t);
                }
                stale => tracing::debug!(?stale, "dropping stale gesture timer"),
            }
        }
    }

    fn release(
        &mut self,
        now: Instant,
        direction: Direction,
        completed: bool,
        t: &mut impl TransportControl,
    ) {
        // Timers due before this release happened first.
        self.advance(now, t);

        let Some((phase, started_at)) = self
            .session
            .as_ref()
            .filter(|s| s.direction == direction)
            .map(|s| (s.phase, s.started_at))
        else {
            return;
        };

        match phase {
            Phase::Pressed => {
                tracing::debug!(
                    ?direction,
                    held_ms = now.duration_since(started_at).as_millis() as u64,
                    completed,
                    "short press"
                );
                self.end_session();
                if completed {
                    t.skip(direction);
                }
            }
            Phase::Scrubbing { .. } => {
                self.end_scrub(t);
                self.end_session();
            }
            Phase::Spent => self.end_session(),
        }
    }

    fn is_current(&self, session: u64) -> bool {
        self.session.as_ref().is_some_and(|s| s.id == session)
    }

    fn begin_scrub(&mut self, now: Instant, t: &mut impl TransportControl) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        // The one-shot already fired; the token is spent.
        session.press_timer = None;

        if !t.has_track() {
            session.phase = Phase::Spent;
            return;
        }

        let was_playing = t.is_playing();
        session.phase = Phase::Scrubbing { was_playing };
        tracing::debug!(direction = ?session.direction, was_playing, "scrub started");

        match session.direction {
            Direction::Forward => {
                t.set_rate(self.config.fast_forward_rate);
                t.start_output();
            }
            Direction::Backward => {
                t.set_rate(1.0);
                t.set_muted(true);
                session.scrub_timer = Some(self.timers.every(
                    now,
                    self.config.rewind_tick,
                    TimerEvent::RewindTick {
                        session: session.id,
                    },
                ));
            }
        }
        t.scrub_changed(Some(session.direction));
    }

    fn rewind_tick(&mut self, t: &mut impl TransportControl) {
        if !t.has_track() {
            self.end_scrub(t);
            return;
        }

        let position = t.position().saturating_sub(self.config.rewind_step);
        t.seek_to(position);
        if position.is_zero() {
            tracing::debug!("rewound to the start of the tape");
            self.end_scrub(t);
        }
    }

    /// Put the deck back to normal and mark the session spent.
    fn end_scrub(&mut self, t: &mut impl TransportControl) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Phase::Scrubbing { was_playing } = session.phase else {
            return;
        };
        session.phase = Phase::Spent;
        if let Some(token) = session.scrub_timer.take() {
            self.timers.cancel(token);
        }

        t.set_rate(1.0);
        t.set_muted(false);
        t.scrub_changed(None);
        if !was_playing {
            t.stop_output();
        }
        tracing::debug!(was_playing, "scrub ended");
    }

    fn end_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        for token in [session.press_timer, session.scrub_timer]
            .into_iter()
            .flatten()
        {
            self.timers.cancel(token);
        }
    }
}
