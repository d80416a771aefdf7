//! Freshness of the last committed update.
//!
//! Tracks when the oracle last committed an update and reports it as stale
//! once more than `threshold` seconds have passed. This is informational: the
//! validity flag returned by reads depends on the window span, not on this
//! threshold.

use crate::{OracleError, Result};

/// Staleness tracker for the oracle's update cadence.
#[derive(Debug, Clone)]
pub struct StalenessGuard {
    /// Oracle time of the last committed update, if any.
    last_update_time: Option<u64>,
    /// Staleness threshold in seconds.
    threshold: u64,
}

impl StalenessGuard {
    /// Create a tracker with no update recorded yet.
    pub fn new(threshold: u64) -> Self {
        Self {
            last_update_time: None,
            threshold,
        }
    }

    /// Record a committed update.
    pub fn record_update(&mut self, update_time: u64) {
        self.last_update_time = Some(update_time);
    }

    /// Seconds since the last update, or `None` before the first one.
    pub fn age(&self, current_time: u64) -> Option<u64> {
        self.last_update_time
            .map(|last| current_time.saturating_sub(last))
    }

    /// Whether the last update is older than the threshold.
    ///
    /// An oracle that has never been updated is stale.
    pub fn is_stale(&self, current_time: u64) -> bool {
        self.age(current_time)
            .map_or(true, |age| age > self.threshold)
    }

    /// Replace the threshold.
    ///
    /// # Errors
    ///
    /// [`OracleError::InvalidParameter`] unless `threshold > 1`.
    pub fn set_threshold(&mut self, threshold: u64) -> Result<()> {
        if threshold <= 1 {
            return Err(OracleError::InvalidParameter {
                name: "stale_threshold",
                reason: format!("must be greater than 1, got {threshold}"),
            });
        }
        self.threshold = threshold;
        Ok(())
    }

    /// Return the timestamp of the last committed update.
    pub fn last_update_time(&self) -> Option<u64> {
        self.last_update_time
    }

    /// Return the configured threshold.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }
}
