/// Tick-polled timer scheduler.
///
/// Time only moves when `advance(dt)` is called, so tests drive it with
/// exact durations. At most one pending timer exists per tag; scheduling
/// a tag again replaces its pending timer.
///
/// Fired tags come back ordered by due time, then by scheduling order.

use std::time::Duration;

#[derive(Clone, Debug)]
struct Timer<T> {
    tag: T,
    due: Duration,
    seq: u64,
    period: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    now: Duration,
    seq: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler { now: Duration::ZERO, seq: 0, timers: Vec::new() }
    }
}

impl<T: Copy + PartialEq> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-shot timer firing `after` from now.
    pub fn schedule(&mut self, after: Duration, tag: T) {
        self.insert(tag, after, None);
    }

    /// Fires every `period`, first time one period from now.
    /// A zero period is ignored.
    pub fn schedule_repeating(&mut self, period: Duration, tag: T) {
        if period.is_zero() {
            return;
        }
        self.insert(tag, period, Some(period));
    }

    pub fn cancel(&mut self, tag: T) {
        self.timers.retain(|t| t.tag != tag);
    }

    /// Time left until `tag` fires.
    pub fn remaining(&self, tag: T) -> Option<Duration> {
        self.timers
            .iter()
            .find(|t| t.tag == tag)
            .map(|t| t.due.saturating_sub(self.now))
    }

    /// Move the clock forward and collect every tag that came due.
    /// A repeating timer may fire more than once if `dt` spans several
    /// periods.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now += dt;
        let mut fired = Vec::new();

        while let Some(i) = self.next_due() {
            fired.push(self.timers[i].tag);
            match self.timers[i].period {
                Some(period) => {
                    self.seq += 1;
                    let timer = &mut self.timers[i];
                    timer.due += period;
                    timer.seq = self.seq;
                }
                None => {
                    self.timers.remove(i);
                }
            }
        }

        fired
    }

    fn next_due(&self) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= self.now)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)
    }

    fn insert(&mut self, tag: T, after: Duration, period: Option<Duration>) {
        self.cancel(tag);
        self.seq += 1;
        self.timers.push(Timer { tag, due: self.now + after, seq: self.seq, period });
    }
}
