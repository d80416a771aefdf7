//! Price source capability.
//!
//! The oracle never talks to a market directly; it asks a [`PriceSource`] for
//! the latest `(value, timestamp)` pair once per update. Validation of the
//! returned sample (positive value, advancing timestamp) is the oracle's job,
//! not the source's.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::OracleError;

/// A raw sample as reported by a price source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSample {
    /// Reported price. May be zero or negative; the oracle rejects those.
    pub value: i128,
    /// Source-side timestamp of the price, in seconds.
    pub timestamp: i64,
}

/// Failure to obtain a sample from a price source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// The source could not be reached.
    #[error("source unreachable: {0}")]
    Unreachable(String),

    /// The source answered with something that is not a price.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A scripted source ran out of samples.
    #[error("no sample available")]
    Exhausted,
}

impl From<SourceError> for OracleError {
    fn from(err: SourceError) -> Self {
        OracleError::SourceUnavailable(err.to_string())
    }
}

/// Anything that can report the latest price.
pub trait PriceSource: Send + Sync {
    /// Fetch the most recent sample.
    fn latest(&self) -> Result<PriceSample, SourceError>;

    /// Human-readable identity, used in notifications and logs.
    fn describe(&self) -> String;
}

impl fmt::Debug for dyn PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PriceSource({})", self.describe())
    }
}

/// A source reporting a settable constant price.
///
/// Each call to [`latest`](PriceSource::latest) reports a timestamp one second
/// past the previous one, so consecutive reads always pass the oracle's
/// monotonicity check.
#[derive(Debug)]
pub struct FixedSource {
    value: Mutex<i128>,
    clock: AtomicI64,
}

impl FixedSource {
    /// A fixed source reporting `value`, with timestamps starting after `start`.
    pub fn new(value: i128, start: i64) -> Self {
        Self {
            value: Mutex::new(value),
            clock: AtomicI64::new(start),
        }
    }

    /// Get the value currently reported.
    pub fn value(&self) -> i128 {
        self.value.lock().map(|v| *v).unwrap_or_default()
    }

    /// Change the reported value.
    pub fn set_value(&self, value: i128) {
        tracing::warn!(new_value = %value, "fixed source: value changed");
        if let Ok(mut current) = self.value.lock() {
            *current = value;
        }
    }
}

impl PriceSource for FixedSource {
    fn latest(&self) -> Result<PriceSample, SourceError> {
        let value = *self
            .value
            .lock()
            .map_err(|_| SourceError::Unreachable("fixed source lock poisoned".to_string()))?;
        let timestamp = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PriceSample { value, timestamp })
    }

    fn describe(&self) -> String {
        format!("fixed:{}", self.value())
    }
}

/// A source replaying a queue of prepared responses in order.
#[derive(Debug)]
pub struct ScriptedSource {
    name: String,
    queue: Mutex<VecDeque<Result<PriceSample, SourceError>>>,
}

impl ScriptedSource {
    /// Create an empty scripted source.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Create a scripted source pre-loaded with samples.
    pub fn with_samples(name: impl Into<String>, samples: &[(i128, i64)]) -> Self {
        let source = Self::new(name);
        for &(value, timestamp) in samples {
            source.push(value, timestamp);
        }
        source
    }

    /// Queue a sample.
    pub fn push(&self, value: i128, timestamp: i64) {
        self.push_result(Ok(PriceSample { value, timestamp }));
    }

    /// Queue a failure.
    pub fn push_error(&self, err: SourceError) {
        self.push_result(Err(err));
    }

    /// Number of queued responses.
    pub fn pending(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or_default()
    }

    /// Drop every queued response, returning how many were dropped.
    pub fn clear(&self) -> usize {
        self.queue
            .lock()
            .map(|mut q| q.drain(..).count())
            .unwrap_or_default()
    }

    fn push_result(&self, result: Result<PriceSample, SourceError>) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(result);
        }
    }
}

impl PriceSource for ScriptedSource {
    fn latest(&self) -> Result<PriceSample, SourceError> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| SourceError::Unreachable("scripted source lock poisoned".to_string()))?;
        queue.pop_front().unwrap_or(Err(SourceError::Exhausted))
    }

    fn describe(&self) -> String {
        format!("scripted:{}", self.name)
    }
}
