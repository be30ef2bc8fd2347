//! Cancellable deferred events driven by the event loop's clock.
//!
//! Nothing here sleeps or spawns: the owner asks for the next deadline, waits
//! for input until then, and drains due events with [`Scheduler::pop_due`].
//! Every scheduled entry is owned through a [`TimerToken`]; cancelling
//! consumes the token, so an entry can be cancelled at most once.

use std::time::{Duration, Instant};

/// Handle to a scheduled entry. Not `Clone`: whoever holds it owns the timer.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a TimerToken leaves the timer running"]
pub struct TimerToken(u64);

#[derive(Debug)]
struct Entry<E> {
    id: u64,
    deadline: Instant,
    period: Option<Duration>,
    event: E,
}

#[derive(Debug)]
pub struct Scheduler<E> {
    next_id: u64,
    entries: Vec<Entry<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<E: Clone> Scheduler<E> {
    /// Fire `event` once, `delay` after `now`.
    pub fn once(&mut self, now: Instant, delay: Duration, event: E) -> TimerToken {
        self.insert(deadline_after(now, delay), None, event)
    }

    /// Fire `event` every `period`, starting one period after `now`.
    pub fn every(&mut self, now: Instant, period: Duration, event: E) -> TimerToken {
        let period = period.max(Duration::from_millis(1));
        self.insert(deadline_after(now, period), Some(period), event)
    }

    /// Cancel a scheduled entry. Returns false if it had already fired.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != token.0);
        self.entries.len() != before
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Take the earliest entry due at `now`.
    ///
    /// One-shot entries are removed; periodic ones are pushed back by one
    /// period, so a late caller drains missed ticks one by one.
    pub fn pop_due(&mut self, now: Instant) -> Option<E> {
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| (e.deadline, e.id))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[pos];
        match entry.period {
            Some(period) => {
                entry.deadline = deadline_after(entry.deadline, period);
                Some(entry.event.clone())
            }
            None => Some(self.entries.swap_remove(pos).event),
        }
    }

    fn insert(&mut self, deadline: Instant, period: Option<Duration>, event: E) -> TimerToken {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline,
            period,
            event,
        });
        TimerToken(id)
    }
}

/// `now + delay`, shortened until it fits in an `Instant` instead of panicking.
fn deadline_after(now: Instant, mut delay: Duration) -> Instant {
    loop {
        if let Some(deadline) = now.checked_add(delay) {
            return deadline;
        }
        delay /= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn one_shot_fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut s = Scheduler::default();
        let _token = s.once(t0, ms(300), "press");

        assert_eq!(s.pop_due(t0 + ms(299)), None);
        assert_eq!(s.pop_due(t0 + ms(300)), Some("press"));
        assert_eq!(s.pop_due(t0 + ms(900)), None);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let t0 = Instant::now();
        let mut s = Scheduler::default();
        let token = s.once(t0, ms(10), 1);
        assert!(s.cancel(token));
        assert_eq!(s.pop_due(t0 + ms(50)), None);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn cancel_after_fire_reports_false() {
        let t0 = Instant::now();
        let mut s = Scheduler::default();
        let token = s.once(t0, ms(10), 1);
        assert_eq!(s.pop_due(t0 + ms(10)), Some(1));
        assert!(!s.cancel(token));
    }

    #[test]
    fn periodic_timer_catches_up_one_tick_at_a_time() {
        let t0 = Instant::now();
        let mut s = Scheduler::default();
        let token = s.every(t0, ms(50), "tick");

        let late = t0 + ms(160);
        let mut fired = 0;
        while s.pop_due(late).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert_eq!(s.next_deadline(), Some(t0 + ms(200)));
        assert!(s.cancel(token));
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn earliest_deadline_fires_first() {
        let t0 = Instant::now();
        let mut s = Scheduler::default();
        let _a = s.once(t0, ms(30), 'a');
        let _b = s.once(t0, ms(10), 'b');
        assert_eq!(s.next_deadline(), Some(t0 + ms(10)));
        assert_eq!(s.pop_due(t0 + ms(40)), Some('b'));
        assert_eq!(s.pop_due(t0 + ms(40)), Some('a'));
    }

    #[test]
    fn huge_delays_do_not_overflow() {
        let t0 = Instant::now();
        let mut s = Scheduler::default();
        let _once = s.once(t0, Duration::MAX, "never");
        let _tick = s.every(t0, Duration::MAX, "rarely");

        assert!(s.next_deadline().is_some_and(|d| d > t0 + Duration::from_secs(3600)));
        assert_eq!(s.pop_due(t0 + Duration::from_secs(3600)), None);
    }
}
