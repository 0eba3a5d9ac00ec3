//! Time-ordered event queue.
//!
//! Events pop in launch-time order. Events that share a launch time pop in
//! the order they were scheduled: the driver relies on this to absorb every
//! simultaneous arrival and preemption before it picks the next process.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::types::{Pid, SimTime, Transition};

/// A pending state transition for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Simulated time at which the event fires.
    pub time: SimTime,
    /// Simulated time at which the event was scheduled.
    pub created: SimTime,
    pub pid: Pid,
    pub transition: Transition,
    /// Tiebreaker for events at the same time (lower = scheduled earlier).
    seq: u64,
}

impl Event {
    pub fn new(time: SimTime, created: SimTime, pid: Pid, transition: Transition) -> Self {
        Event {
            time,
            created,
            pid,
            transition,
            seq: 0,
        }
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-queue of events keyed by `(time, insertion order)`.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event behind every queued event with the same launch time.
    pub fn schedule(&mut self, mut event: Event) {
        event.seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(event));
    }

    /// Remove the earliest event, or `None` once the queue has drained.
    pub fn pop_earliest(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    /// Launch time of the earliest queued event.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(event)| event.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
