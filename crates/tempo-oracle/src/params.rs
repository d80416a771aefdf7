//! Oracle construction parameters.
//!
//! `window_size` is split into `granularity` equal periods; the period is the
//! minimum spacing between two accepted observations. Windows that do not
//! divide evenly are rejected rather than rounded.

use serde::{Deserialize, Serialize};

use crate::{OracleError, Result};

/// Default staleness threshold in seconds (1 hour).
pub const DEFAULT_STALE_THRESHOLD: u64 = 3600;

/// Parameters supplied when building a [`TwapOracle`](crate::TwapOracle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleParams {
    /// Nominal span of the moving average, in seconds.
    pub window_size: u64,
    /// Number of observations contributing to the average.
    pub granularity: u64,
    /// Scale factor applied to the average on read.
    #[serde(default = "default_multiplier")]
    pub multiplier: u64,
    /// Ceiling on the real span of the in-window observations.
    pub max_window_size: u64,
    /// Age after which the last update is considered stale.
    #[serde(default = "default_stale_threshold")]
    pub stale_threshold: u64,
}

fn default_multiplier() -> u64 {
    1
}

fn default_stale_threshold() -> u64 {
    DEFAULT_STALE_THRESHOLD
}

impl OracleParams {
    /// Parameters with a multiplier of 1 and the default stale threshold.
    pub fn new(window_size: u64, granularity: u64, max_window_size: u64) -> Self {
        Self {
            window_size,
            granularity,
            multiplier: default_multiplier(),
            max_window_size,
            stale_threshold: default_stale_threshold(),
        }
    }

    /// Override the read multiplier.
    pub fn with_multiplier(mut self, multiplier: u64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Check every construction invariant and return the period size.
    ///
    /// # Errors
    ///
    /// [`OracleError::Construction`] if:
    /// - `window_size` is zero
    /// - `granularity` is not greater than 1
    /// - `window_size` is not evenly divisible by `granularity`
    /// - `multiplier` is zero
    /// - `max_window_size` is not greater than `window_size`
    /// - `stale_threshold` is not greater than 1
    pub fn validate(&self) -> Result<u64> {
        if self.window_size == 0 {
            return Err(OracleError::Construction(
                "window size must be non-zero".to_string(),
            ));
        }
        if self.granularity <= 1 {
            return Err(OracleError::Construction(format!(
                "granularity must be greater than 1, got {}",
                self.granularity
            )));
        }
        let period_size = self.window_size / self.granularity;
        if period_size.checked_mul(self.granularity) != Some(self.window_size) {
            return Err(OracleError::Construction(format!(
                "window size {} is not divisible by granularity {}",
                self.window_size, self.granularity
            )));
        }
        if self.multiplier == 0 {
            return Err(OracleError::Construction(
                "multiplier must be at least 1".to_string(),
            ));
        }
        if self.max_window_size <= self.window_size {
            return Err(OracleError::Construction(format!(
                "max window size {} must exceed window size {}",
                self.max_window_size, self.window_size
            )));
        }
        if self.stale_threshold <= 1 {
            return Err(OracleError::Construction(format!(
                "stale threshold must be greater than 1, got {}",
                self.stale_threshold
            )));
        }
        Ok(period_size)
    }
}
