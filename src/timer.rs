use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::playback::TickTicket;

/// The host's "call me back after a delay" primitive.
///
/// Implementations must deliver each ticket back to the session on the same logical thread that
/// owns it; cancellation is handled by the ticket's epoch, not by the scheduler.
pub trait Scheduler {
    /// Arrange for `ticket` to be delivered after `delay`.
    fn schedule(&mut self, delay: Duration, ticket: TickTicket);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Pending {
    deadline: Duration,
    // Insertion order breaks deadline ties.
    seq: u64,
    ticket: TickTicket,
}

/// Deterministic virtual-clock timer queue.
///
/// Time only moves when the owner advances it, which makes animation runs reproducible for
/// offline rendering and tests.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_seq: u64,
    pending: BinaryHeap<Reverse<Pending>>,
}

impl TimerQueue {
    /// Empty queue at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of scheduled callbacks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Return `true` when nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Deadline of the earliest scheduled callback.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.peek().map(|Reverse(p)| p.deadline)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_by(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Pop the earliest callback whose deadline has passed.
    pub fn pop_due(&mut self) -> Option<TickTicket> {
        let due = self.next_deadline()? <= self.now;
        if !due {
            return None;
        }
        self.pending.pop().map(|Reverse(p)| p.ticket)
    }

    /// Jump the clock to the earliest deadline and pop that callback.
    pub fn advance_to_next(&mut self) -> Option<TickTicket> {
        let Reverse(p) = self.pending.pop()?;
        self.now = self.now.max(p.deadline);
        Some(p.ticket)
    }

    /// Forget every scheduled callback.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration, ticket: TickTicket) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.pending.push(Reverse(Pending {
            deadline: self.now.saturating_add(delay),
            seq,
            ticket,
        }));
    }
}

#[cfg(test)]
#[path = "../tests/unit/timer/queue.rs"]
mod tests;
