//! Observation log.
//!
//! Logically an append-only sequence indexed from 0. Only the last
//! `granularity` entries are ever read back, so storage is a ring buffer of
//! `granularity` slots addressed by `index % granularity`. Slots are allocated
//! as observations arrive.

use serde::{Deserialize, Serialize};

/// A single recorded sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Oracle time at which the sample was recorded.
    pub timestamp: u64,
    /// Source value multiplied by the seconds since the previous sample.
    pub time_adjusted_value: u128,
}

/// Ring buffer holding the tail of the observation sequence.
#[derive(Debug, Clone)]
pub struct ObservationLog {
    slots: Vec<Observation>,
    capacity: u64,
    len: u64,
}

impl ObservationLog {
    /// Create an empty log retaining the last `granularity` observations.
    pub fn new(granularity: u64) -> Self {
        Self {
            slots: Vec::new(),
            capacity: granularity,
            len: 0,
        }
    }

    /// Total number of observations ever appended.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the oldest observation still inside the window.
    pub fn earliest_index_in_window(&self) -> u64 {
        self.len.saturating_sub(self.capacity)
    }

    /// Observation at a logical index, if it is still retained.
    pub fn observation_at(&self, index: u64) -> Option<&Observation> {
        if index >= self.len || index < self.earliest_index_in_window() {
            return None;
        }
        self.slots.get(self.slot(index)?)
    }

    /// The most recently appended observation.
    pub fn last(&self) -> Option<&Observation> {
        self.observation_at(self.len.checked_sub(1)?)
    }

    /// Observations still in the window, oldest first.
    pub fn window(&self) -> impl Iterator<Item = &Observation> + '_ {
        (self.earliest_index_in_window()..self.len).filter_map(move |i| self.observation_at(i))
    }

    /// Append an observation, overwriting the slot of the one leaving the window.
    pub fn append(&mut self, observation: Observation) {
        match self.slot(self.len) {
            Some(slot) if slot < self.slots.len() => self.slots[slot] = observation,
            _ => self.slots.push(observation),
        }
        self.len += 1;
    }

    fn slot(&self, index: u64) -> Option<usize> {
        usize::try_from(index.checked_rem(self.capacity)?).ok()
    }
}
