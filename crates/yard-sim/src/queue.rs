//! `EventQueue`: pending events ordered by time, then insertion.
//!
//! Keyed by `(timestamp, sequence)` in a `BTreeMap`.  The sequence number is
//! a counter bumped on every push, so events with equal timestamps pop in
//! the order they were scheduled and every run is reproducible.

use std::collections::BTreeMap;

use yard_core::{Event, SimTime};

#[derive(Debug, Default)]
pub struct EventQueue {
    inner:    BTreeMap<(SimTime, u64), Event>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event`.  Returns its sequence number.
    pub fn push(&mut self, event: Event) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.inner.insert((event.timestamp, seq), event);
        seq
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<Event> {
        self.inner.pop_first().map(|(_, event)| event)
    }

    /// Timestamp of the earliest event, if any.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.inner.keys().next().map(|&(t, _)| t)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Pending events in pop order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.inner.values()
    }
}
