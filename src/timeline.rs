//! Delayed callbacks driven by the host's clock.
//!
//! Nothing here sleeps or spawns: the host calls [`Timeline::drain_due`] with
//! the current time (egui's frame clock in the viewer) and applies whatever
//! came due, in the order it was scheduled.

use std::time::Duration;

#[derive(Debug)]
struct Entry<T> {
    at: Duration,
    seq: u64,
    event: T,
}

#[derive(Debug)]
pub struct Timeline<T> {
    entries: Vec<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Duration, event: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { at, seq, event });
    }

    /// Remove and return every event due at `now`, earliest first. Events due
    /// at the same instant keep their scheduling order.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.at <= now);
        self.entries = pending;
        due.sort_by_key(|e| (e.at, e.seq));
        due.into_iter().map(|e| e.event).collect()
    }

    /// Earliest pending deadline, so the host knows when to wake up.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.at).min()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
