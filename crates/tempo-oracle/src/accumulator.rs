//! Window accumulator.
//!
//! Keeps `cumulative_sum` equal to the sum of `time_adjusted_value` over the
//! observations currently in the window. Each insertion adds the new value and,
//! once the window is full, subtracts the value leaving it; the log is never
//! rescanned.

use crate::observations::{Observation, ObservationLog};
use crate::{OracleError, Result};

/// Running sum over the in-window observations.
#[derive(Debug, Clone)]
pub struct Accumulator {
    log: ObservationLog,
    granularity: u64,
    cumulative_sum: u128,
}

impl Accumulator {
    /// Create an empty accumulator over `granularity` observations.
    pub fn new(granularity: u64) -> Self {
        Self {
            log: ObservationLog::new(granularity),
            granularity,
            cumulative_sum: 0,
        }
    }

    /// Current window sum.
    pub fn cumulative_sum(&self) -> u128 {
        self.cumulative_sum
    }

    /// The underlying observation log.
    pub fn log(&self) -> &ObservationLog {
        &self.log
    }

    /// The value that would leave the window on the next insertion, if any.
    fn outgoing(&self) -> Option<u128> {
        if self.log.len() < self.granularity {
            return None;
        }
        self.log
            .observation_at(self.log.earliest_index_in_window())
            .map(|o| o.time_adjusted_value)
    }

    /// Sum the window would hold after inserting `time_adjusted_value`.
    ///
    /// # Errors
    ///
    /// [`OracleError::Overflow`] if the sum leaves the `u128` range.
    pub fn next_sum(&self, time_adjusted_value: u128) -> Result<u128> {
        let retained = match self.outgoing() {
            Some(outgoing) => self
                .cumulative_sum
                .checked_sub(outgoing)
                .ok_or(OracleError::Overflow("cumulative sum underflow"))?,
            None => self.cumulative_sum,
        };
        retained
            .checked_add(time_adjusted_value)
            .ok_or(OracleError::Overflow("cumulative sum"))
    }

    /// Append a new observation and roll the window sum forward.
    ///
    /// Nothing is modified if the new sum cannot be computed.
    pub fn record_new_observation(
        &mut self,
        time_adjusted_value: u128,
        now: u64,
    ) -> Result<Observation> {
        let next = self.next_sum(time_adjusted_value)?;
        let observation = Observation {
            timestamp: now,
            time_adjusted_value,
        };
        self.log.append(observation);
        self.cumulative_sum = next;
        Ok(observation)
    }
}
