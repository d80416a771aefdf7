//! # tempo-oracle
//!
//! Windowed TWAP (Time-Weighted Average Price) oracle.
//!
//! The oracle samples an external price source on caller-driven updates,
//! keeps a running sum of time-adjusted samples over the last `granularity`
//! observations, and exposes the resulting average together with a validity
//! flag. Every update is atomic: a rejected update leaves the oracle exactly
//! as it was.
//!
//! ## Modules
//!
//! - [`params`] — construction parameters and their validation
//! - [`observations`] — fixed-capacity observation ring buffer
//! - [`accumulator`] — incrementally maintained window sum
//! - [`oracle`] — update protocol, queries and administration
//! - [`shared`] — single-writer / many-reader wrapper
//! - [`source`] — price source capability and stock sources
//! - [`auth`] — authorization capability for admin mutations
//! - [`events`] — configuration and update notifications
//! - [`staleness`] — freshness of the last committed update

pub mod accumulator;
pub mod auth;
pub mod events;
pub mod observations;
pub mod oracle;
pub mod params;
pub mod shared;
pub mod source;
pub mod staleness;

pub use auth::{AllowAll, AllowList, Authorizer, Principal};
pub use events::{EventBus, OracleEvent};
pub use observations::{Observation, ObservationLog};
pub use oracle::{OraclePhase, OracleSnapshot, TwapOracle};
pub use params::{OracleParams, DEFAULT_STALE_THRESHOLD};
pub use shared::SharedOracle;
pub use source::{FixedSource, PriceSample, PriceSource, ScriptedSource, SourceError};

/// Error types for oracle operations.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Construction parameters are invalid; no oracle was created.
    #[error("invalid construction parameters: {0}")]
    Construction(String),

    /// Less than one period has passed since the last observation.
    #[error("update too soon: {elapsed}s elapsed, period is {period}s")]
    TooSoon {
        /// Seconds since the last observation (0 if the clock went backwards).
        elapsed: u64,
        /// Required minimum spacing between observations.
        period: u64,
    },

    /// The price source could not produce a sample.
    #[error("price source unavailable: {0}")]
    SourceUnavailable(String),

    /// The price source returned a zero or negative value.
    #[error("invalid source value: {0}")]
    InvalidSourceValue(i128),

    /// The source timestamp did not advance past the last accepted one.
    #[error("stale or replayed source timestamp: {new} <= {last}")]
    StaleOrReplayedTimestamp {
        /// Timestamp reported by the source.
        new: i64,
        /// Last accepted source timestamp.
        last: i64,
    },

    /// A checked arithmetic operation overflowed.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// The averaging time base was zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An admin mutation was given an out-of-range value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter being set.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The caller may not change configuration.
    #[error("principal {0} is not authorized")]
    Unauthorized(String),

    /// The average is not currently usable.
    #[error("invalid price feed")]
    InvalidPriceFeed,

    /// A thread panicked while holding the oracle lock.
    #[error("oracle lock poisoned")]
    LockPoisoned,
}

/// Convenience result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;
