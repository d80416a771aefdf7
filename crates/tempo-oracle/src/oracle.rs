//! The TWAP oracle state machine.
//!
//! An oracle moves through three phases as updates are committed:
//!
//! ```text
//! Uninitialized (0) -> Warming (1..=granularity) -> Steady (> granularity)
//! ```
//!
//! Only a `Steady` oracle can produce a valid read. Each update samples the
//! price source, weights the sample by the seconds since the previous
//! observation, rolls the window sum forward and divides it by the real time
//! spanned by the window:
//!
//! ```text
//! average = sum(value_i * elapsed_i) / (now - window_start)
//! ```
//!
//! `window_start` is the timestamp of the oldest observation in the window
//! before the update, so the divisor tracks the actual call cadence rather
//! than the nominal window size.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::accumulator::Accumulator;
use crate::auth::{Authorizer, Principal};
use crate::events::{EventBus, OracleEvent};
use crate::observations::ObservationLog;
use crate::params::OracleParams;
use crate::source::PriceSource;
use crate::staleness::StalenessGuard;
use crate::{OracleError, Result};

/// Lifecycle phase derived from the number of committed updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OraclePhase {
    /// No update has been committed.
    Uninitialized,
    /// The window is still filling; reads are invalid.
    Warming,
    /// The window is full; reads may be valid.
    Steady,
}

/// Point-in-time copy of the oracle's configuration and accumulator state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSnapshot {
    /// Nominal window in seconds.
    pub window_size: u64,
    /// Observations per window.
    pub granularity: u64,
    /// Minimum spacing between updates.
    pub period_size: u64,
    /// Read scale factor.
    pub multiplier: u64,
    /// Ceiling on the real window span.
    pub max_window_size: u64,
    /// Staleness threshold for the update cadence.
    pub stale_threshold: u64,
    /// Sum of time-adjusted values in the window.
    pub cumulative_sum: u128,
    /// Committed updates.
    pub update_count: u64,
    /// Last accepted source timestamp (0 before the first update).
    pub last_source_timestamp: i64,
    /// Oracle time of the last committed update.
    pub last_update_time: Option<u64>,
    /// Unscaled average.
    pub current_average: u128,
    /// Lifecycle phase.
    pub phase: OraclePhase,
}

/// Windowed time-weighted average price oracle.
#[derive(Debug)]
pub struct TwapOracle {
    window_size: u64,
    granularity: u64,
    period_size: u64,
    multiplier: u64,
    max_window_size: u64,
    source: Arc<dyn PriceSource>,
    authorizer: Arc<dyn Authorizer>,
    accumulator: Accumulator,
    staleness: StalenessGuard,
    last_source_timestamp: i64,
    current_average: u128,
    /// `current_average * multiplier`, checked when the average is committed.
    scaled_average: u128,
    events: EventBus,
}

impl TwapOracle {
    /// Build an oracle from validated parameters.
    ///
    /// # Errors
    ///
    /// [`OracleError::Construction`] if `params` violate any invariant; see
    /// [`OracleParams::validate`].
    pub fn new(
        params: OracleParams,
        source: Arc<dyn PriceSource>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Result<Self> {
        let period_size = params.validate()?;
        debug!(
            window_size = params.window_size,
            granularity = params.granularity,
            period_size,
            source = %source.describe(),
            "twap oracle created"
        );
        Ok(Self {
            window_size: params.window_size,
            granularity: params.granularity,
            period_size,
            multiplier: params.multiplier,
            max_window_size: params.max_window_size,
            source,
            authorizer,
            accumulator: Accumulator::new(params.granularity),
            staleness: StalenessGuard::new(params.stale_threshold),
            last_source_timestamp: 0,
            current_average: 0,
            scaled_average: 0,
            events: EventBus::default(),
        })
    }

    /// Publish notifications on `events` instead of a private bus.
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    // ---------------------------------------------------------------------
    // Update protocol
    // ---------------------------------------------------------------------

    /// Sample the price source and fold the sample into the average.
    ///
    /// Returns the new unscaled average. On any error the oracle is left
    /// exactly as it was before the call.
    ///
    /// # Errors
    ///
    /// - [`OracleError::TooSoon`] if less than one period has passed since the
    ///   last observation
    /// - [`OracleError::SourceUnavailable`] if the source fails
    /// - [`OracleError::InvalidSourceValue`] if the sampled value is not positive
    /// - [`OracleError::StaleOrReplayedTimestamp`] if the source timestamp is
    ///   not positive or does not advance
    /// - [`OracleError::Overflow`] if any intermediate value overflows
    /// - [`OracleError::DivisionByZero`] if the window spans zero seconds
    pub fn update_result(&mut self, now: u64) -> Result<u128> {
        let elapsed = match self.accumulator.log().last() {
            None => self.period_size,
            Some(last) => now.saturating_sub(last.timestamp),
        };
        if elapsed < self.period_size {
            debug!(now, elapsed, period = self.period_size, "update rejected: too soon");
            return Err(OracleError::TooSoon {
                elapsed,
                period: self.period_size,
            });
        }

        let sample = self.source.latest().map_err(|err| {
            debug!(error = %err, "update rejected: source unavailable");
            OracleError::from(err)
        })?;

        if sample.value <= 0 {
            debug!(value = %sample.value, "update rejected: invalid source value");
            return Err(OracleError::InvalidSourceValue(sample.value));
        }
        if sample.timestamp <= 0 || sample.timestamp <= self.last_source_timestamp {
            debug!(
                new = sample.timestamp,
                last = self.last_source_timestamp,
                "update rejected: stale or replayed timestamp"
            );
            return Err(OracleError::StaleOrReplayedTimestamp {
                new: sample.timestamp,
                last: self.last_source_timestamp,
            });
        }

        let time_since_first = match self.window_start() {
            Some(start) => now.saturating_sub(start),
            None => elapsed,
        };

        let value = u128::try_from(sample.value)
            .map_err(|_| OracleError::InvalidSourceValue(sample.value))?;
        let time_adjusted_value = value
            .checked_mul(u128::from(elapsed))
            .ok_or(OracleError::Overflow("time-adjusted value"))?;

        // Everything fallible is checked before the accumulator is touched.
        let next_sum = self.accumulator.next_sum(time_adjusted_value)?;
        let average = next_sum
            .checked_div(u128::from(time_since_first))
            .ok_or(OracleError::DivisionByZero)?;
        let scaled = average
            .checked_mul(u128::from(self.multiplier))
            .ok_or(OracleError::Overflow("scaled average"))?;

        self.accumulator
            .record_new_observation(time_adjusted_value, now)?;
        self.current_average = average;
        self.scaled_average = scaled;
        self.last_source_timestamp = sample.timestamp;
        self.staleness.record_update(now);

        let update_count = self.update_count();
        info!(
            now,
            update_count,
            average = %average,
            cumulative_sum = %self.accumulator.cumulative_sum(),
            "twap updated"
        );
        self.events.emit(OracleEvent::UpdateCompleted {
            average,
            update_count,
            timestamp: now,
        });
        Ok(average)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Scaled average, if the feed is currently valid.
    ///
    /// # Errors
    ///
    /// [`OracleError::InvalidPriceFeed`] unless the average is positive, the
    /// oracle is [`Steady`](OraclePhase::Steady) and the window span at `now`
    /// is within `max_window_size`.
    pub fn read(&self, now: u64) -> Result<u128> {
        if !self.is_valid(now) {
            return Err(OracleError::InvalidPriceFeed);
        }
        Ok(self.scaled_average)
    }

    /// Scaled average and whether it is valid at `now`. Never fails.
    pub fn read_with_validity(&self, now: u64) -> (u128, bool) {
        (self.scaled_average, self.is_valid(now))
    }

    fn is_valid(&self, now: u64) -> bool {
        self.current_average > 0
            && self.update_count() > self.granularity
            && self.time_elapsed_since_first_observation_in_window(now) <= self.max_window_size
    }

    /// Seconds between the oldest in-window observation and `now`.
    ///
    /// Zero until at least two updates have been committed.
    pub fn time_elapsed_since_first_observation_in_window(&self, now: u64) -> u64 {
        if self.update_count() <= 1 {
            return 0;
        }
        self.window_start()
            .map_or(0, |start| now.saturating_sub(start))
    }

    fn window_start(&self) -> Option<u64> {
        let log = self.accumulator.log();
        log.observation_at(log.earliest_index_in_window())
            .map(|o| o.timestamp)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> OraclePhase {
        match self.update_count() {
            0 => OraclePhase::Uninitialized,
            n if n <= self.granularity => OraclePhase::Warming,
            _ => OraclePhase::Steady,
        }
    }

    /// Whether the last committed update is older than the stale threshold.
    pub fn is_stale(&self, now: u64) -> bool {
        self.staleness.is_stale(now)
    }

    /// Copy of the configuration and accumulator state.
    pub fn snapshot(&self) -> OracleSnapshot {
        OracleSnapshot {
            window_size: self.window_size,
            granularity: self.granularity,
            period_size: self.period_size,
            multiplier: self.multiplier,
            max_window_size: self.max_window_size,
            stale_threshold: self.staleness.threshold(),
            cumulative_sum: self.accumulator.cumulative_sum(),
            update_count: self.update_count(),
            last_source_timestamp: self.last_source_timestamp,
            last_update_time: self.staleness.last_update_time(),
            current_average: self.current_average,
            phase: self.phase(),
        }
    }

    /// Number of committed updates.
    pub fn update_count(&self) -> u64 {
        self.accumulator.log().len()
    }

    /// Sum of time-adjusted values in the window.
    pub fn cumulative_sum(&self) -> u128 {
        self.accumulator.cumulative_sum()
    }

    /// Unscaled average from the last committed update.
    pub fn current_average(&self) -> u128 {
        self.current_average
    }

    /// Last accepted source timestamp.
    pub fn last_source_timestamp(&self) -> i64 {
        self.last_source_timestamp
    }

    /// Oracle time of the last committed update.
    pub fn last_update_time(&self) -> Option<u64> {
        self.staleness.last_update_time()
    }

    /// The retained tail of the observation log.
    pub fn observations(&self) -> &ObservationLog {
        self.accumulator.log()
    }

    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    pub fn granularity(&self) -> u64 {
        self.granularity
    }

    pub fn period_size(&self) -> u64 {
        self.period_size
    }

    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    pub fn max_window_size(&self) -> u64 {
        self.max_window_size
    }

    pub fn stale_threshold(&self) -> u64 {
        self.staleness.threshold()
    }

    /// The price source currently sampled.
    pub fn source(&self) -> &Arc<dyn PriceSource> {
        &self.source
    }

    /// The bus notifications are published on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ---------------------------------------------------------------------
    // Administration
    // ---------------------------------------------------------------------

    fn authorize(&self, principal: &Principal, operation: &str) -> Result<()> {
        if self.authorizer.is_authorized(principal) {
            return Ok(());
        }
        warn!(%principal, operation, "unauthorized admin call");
        Err(OracleError::Unauthorized(principal.to_string()))
    }

    fn config_changed(&self, parameter: &str, value: String) {
        info!(parameter, value = %value, "oracle configuration changed");
        self.events.emit(OracleEvent::ConfigChanged {
            parameter: parameter.to_string(),
            value,
        });
    }

    /// Change the ceiling on the real window span.
    ///
    /// # Errors
    ///
    /// - [`OracleError::Unauthorized`] if `principal` may not change config
    /// - [`OracleError::InvalidParameter`] unless `value > window_size`
    pub fn set_max_window_size(&mut self, principal: &Principal, value: u64) -> Result<()> {
        self.authorize(principal, "set_max_window_size")?;
        if value <= self.window_size {
            debug!(value, window_size = self.window_size, "max window size rejected");
            return Err(OracleError::InvalidParameter {
                name: "max_window_size",
                reason: format!("must exceed window size {}, got {value}", self.window_size),
            });
        }
        self.max_window_size = value;
        self.config_changed("max_window_size", value.to_string());
        Ok(())
    }

    /// Change the stale threshold.
    ///
    /// # Errors
    ///
    /// - [`OracleError::Unauthorized`] if `principal` may not change config
    /// - [`OracleError::InvalidParameter`] unless `value > 1`
    pub fn set_stale_threshold(&mut self, principal: &Principal, value: u64) -> Result<()> {
        self.authorize(principal, "set_stale_threshold")?;
        self.staleness.set_threshold(value)?;
        self.config_changed("stale_threshold", value.to_string());
        Ok(())
    }

    /// Replace the price source.
    ///
    /// # Errors
    ///
    /// [`OracleError::Unauthorized`] if `principal` may not change config.
    pub fn set_price_source(
        &mut self,
        principal: &Principal,
        source: Arc<dyn PriceSource>,
    ) -> Result<()> {
        self.authorize(principal, "set_price_source")?;
        let described = source.describe();
        self.source = source;
        self.config_changed("price_source", described);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AllowAll, AllowList};
    use crate::source::{FixedSource, ScriptedSource, SourceError};

    const T0: u64 = 1_700_000_000;

    fn oracle_with(
        params: OracleParams,
        source: &Arc<ScriptedSource>,
    ) -> TwapOracle {
        TwapOracle::new(params, source.clone(), Arc::new(AllowAll)).expect("valid oracle")
    }

    /// granularity 4, window 400, period 100, max window 800.
    fn small_oracle() -> (TwapOracle, Arc<ScriptedSource>) {
        let source = Arc::new(ScriptedSource::new("test"));
        (oracle_with(OracleParams::new(400, 4, 800), &source), source)
    }

    #[test]
    fn test_construction_rejects_non_divisible_window() {
        let source = Arc::new(ScriptedSource::new("test"));
        let err = TwapOracle::new(OracleParams::new(1000, 3, 2000), source, Arc::new(AllowAll))
            .expect_err("non-divisible window");
        assert!(matches!(err, OracleError::Construction(_)));
    }

    #[test]
    fn test_construction_daily_window() {
        let source = Arc::new(ScriptedSource::new("test"));
        let oracle = oracle_with(OracleParams::new(86_400, 24, 90_000), &source);
        assert_eq!(oracle.period_size(), 3600);
        assert_eq!(oracle.phase(), OraclePhase::Uninitialized);
        assert_eq!(oracle.update_count(), 0);
    }

    #[test]
    fn test_first_update_uses_period_as_elapsed() {
        let (mut oracle, source) = small_oracle();
        source.push(10, 1);
        let average = oracle.update_result(T0).expect("first update");
        assert_eq!(average, 10);
        assert_eq!(oracle.cumulative_sum(), 1000);
        assert_eq!(oracle.phase(), OraclePhase::Warming);
        assert_eq!(oracle.last_update_time(), Some(T0));
    }

    #[test]
    fn test_too_soon_leaves_state_unchanged() {
        let (mut oracle, source) = small_oracle();
        source.push(10, 1);
        oracle.update_result(T0).expect("first update");
        let before = oracle.snapshot();

        source.push(20, 2);
        let err = oracle.update_result(T0 + 99).expect_err("too soon");
        assert!(matches!(err, OracleError::TooSoon { elapsed: 99, period: 100 }));
        assert_eq!(oracle.snapshot(), before);
        // The source was not consulted.
        assert_eq!(source.pending(), 1);
    }

    #[test]
    fn test_clock_going_backwards_is_too_soon() {
        let (mut oracle, source) = small_oracle();
        source.push(10, 1);
        oracle.update_result(T0).expect("first update");
        let err = oracle.update_result(T0 - 500).expect_err("clock went back");
        assert!(matches!(err, OracleError::TooSoon { elapsed: 0, .. }));
    }

    #[test]
    fn test_replayed_timestamp_rejected() {
        let (mut oracle, source) = small_oracle();
        source.push(10, 50);
        oracle.update_result(T0).expect("first update");

        for replayed in [50, 49] {
            source.push(10, replayed);
            let err = oracle.update_result(T0 + 100).expect_err("replay");
            assert!(matches!(
                err,
                OracleError::StaleOrReplayedTimestamp { last: 50, .. }
            ));
        }
        assert_eq!(oracle.update_count(), 1);
    }

    #[test]
    fn test_non_positive_timestamp_rejected() {
        let (mut oracle, source) = small_oracle();
        source.push(10, 0);
        let err = oracle.update_result(T0).expect_err("zero timestamp");
        assert!(matches!(
            err,
            OracleError::StaleOrReplayedTimestamp { new: 0, last: 0 }
        ));
        source.push(10, -7);
        assert!(oracle.update_result(T0).is_err());
        assert_eq!(oracle.phase(), OraclePhase::Uninitialized);
    }

    #[test]
    fn test_non_positive_value_rejected() {
        let (mut oracle, source) = small_oracle();
        for value in [0, -1, i128::MIN] {
            source.push(value, 1);
            let err = oracle.update_result(T0).expect_err("bad value");
            assert!(matches!(err, OracleError::InvalidSourceValue(v) if v == value));
        }
        assert_eq!(oracle.update_count(), 0);
    }

    #[test]
    fn test_source_failure_leaves_state_unchanged() {
        let (mut oracle, source) = small_oracle();
        source.push(10, 1);
        oracle.update_result(T0).expect("first update");
        let before = oracle.snapshot();

        source.push_error(SourceError::Unreachable("connection refused".to_string()));
        let err = oracle.update_result(T0 + 100).expect_err("source down");
        assert!(matches!(err, OracleError::SourceUnavailable(_)));
        assert_eq!(oracle.snapshot(), before);

        // Exhausted source behaves the same way.
        let err = oracle.update_result(T0 + 100).expect_err("no sample");
        assert!(matches!(err, OracleError::SourceUnavailable(_)));
    }

    #[test]
    fn test_time_adjusted_overflow_is_atomic() {
        let (mut oracle, source) = small_oracle();
        source.push(i128::MAX, 1);
        let err = oracle.update_result(T0).expect_err("overflow");
        assert!(matches!(err, OracleError::Overflow(_)));
        assert_eq!(oracle.update_count(), 0);
        assert_eq!(oracle.cumulative_sum(), 0);
    }

    #[test]
    fn test_scaled_average_overflow_is_atomic() {
        let source = Arc::new(ScriptedSource::new("test"));
        let mut oracle = oracle_with(OracleParams::new(400, 4, 800).with_multiplier(1000), &source);
        source.push(i128::MAX / 200, 1);
        let err = oracle.update_result(T0).expect_err("scaled overflow");
        assert!(matches!(err, OracleError::Overflow("scaled average")));
        assert_eq!(oracle.update_count(), 0);
        assert_eq!(oracle.current_average(), 0);
    }

    #[test]
    fn test_end_to_end_window() {
        let (mut oracle, source) = small_oracle();
        let expected_averages = [10u128, 30, 30, 33, 35];

        for (i, value) in [10i128, 20, 30, 40, 50].into_iter().enumerate() {
            let offset = i as u64 * 100;
            source.push(value, (T0 + offset) as i64);
            let average = oracle.update_result(T0 + offset).expect("update");
            assert_eq!(average, expected_averages[i]);

            if i < 4 {
                let err = oracle.read(T0 + offset).expect_err("not steady yet");
                assert!(matches!(err, OracleError::InvalidPriceFeed));
            }
        }

        assert_eq!(oracle.update_count(), 5);
        assert_eq!(oracle.phase(), OraclePhase::Steady);
        assert_eq!(oracle.cumulative_sum(), (20 + 30 + 40 + 50) * 100);
        assert_eq!(oracle.time_elapsed_since_first_observation_in_window(T0 + 400), 300);
        assert_eq!(oracle.read(T0 + 400).expect("steady read"), 35);
        assert_eq!(oracle.read_with_validity(T0 + 400), (35, true));
    }

    #[test]
    fn test_window_span_ceiling_invalidates_read() {
        let (mut oracle, source) = small_oracle();
        for i in 0..5u64 {
            source.push(100, (i + 1) as i64);
            oracle.update_result(T0 + i * 100).expect("update");
        }
        // Oldest in-window observation is at T0 + 100; ceiling is 800.
        assert!(oracle.read(T0 + 900).is_ok());
        let err = oracle.read(T0 + 901).expect_err("window too old");
        assert!(matches!(err, OracleError::InvalidPriceFeed));
        assert_eq!(oracle.read_with_validity(T0 + 901), (100, false));
    }

    #[test]
    fn test_multiplier_applied_on_read() {
        let source = Arc::new(ScriptedSource::new("test"));
        let mut oracle = oracle_with(OracleParams::new(400, 4, 800).with_multiplier(1_000), &source);
        for i in 0..5u64 {
            source.push(7, (i + 1) as i64);
            oracle.update_result(T0 + i * 100).expect("update");
        }
        assert_eq!(oracle.current_average(), 7);
        assert_eq!(oracle.read(T0 + 400).expect("read"), 7_000);
    }

    #[test]
    fn test_read_with_validity_before_updates() {
        let (oracle, _source) = small_oracle();
        assert_eq!(oracle.read_with_validity(T0), (0, false));
        assert_eq!(oracle.time_elapsed_since_first_observation_in_window(T0), 0);
        assert!(oracle.is_stale(T0));
    }

    #[test]
    fn test_irregular_cadence_divides_by_real_span() {
        let (mut oracle, source) = small_oracle();
        source.push(10, 1);
        oracle.update_result(T0).expect("update");
        // 250s gap: sample weighted by 250, divisor is the real 250s span.
        source.push(20, 2);
        let average = oracle.update_result(T0 + 250).expect("update");
        assert_eq!(oracle.cumulative_sum(), 10 * 100 + 20 * 250);
        assert_eq!(average, (10 * 100 + 20 * 250) / 250);
    }

    #[test]
    fn test_update_emits_event() {
        let (mut oracle, source) = small_oracle();
        let mut rx = oracle.events().subscribe();
        source.push(10, 1);
        oracle.update_result(T0).expect("update");
        let event = rx.try_recv().expect("event");
        assert_eq!(
            event,
            OracleEvent::UpdateCompleted {
                average: 10,
                update_count: 1,
                timestamp: T0,
            }
        );
    }

    #[test]
    fn test_staleness_tracks_updates() {
        let (mut oracle, source) = small_oracle();
        source.push(10, 1);
        oracle.update_result(T0).expect("update");
        assert!(!oracle.is_stale(T0 + 3600));
        assert!(oracle.is_stale(T0 + 3601));
    }

    fn admin_oracle() -> TwapOracle {
        let source = Arc::new(ScriptedSource::new("test"));
        TwapOracle::new(
            OracleParams::new(400, 4, 800),
            source,
            Arc::new(AllowList::new(["ops"])),
        )
        .expect("valid oracle")
    }

    #[test]
    fn test_set_max_window_size() {
        let mut oracle = admin_oracle();
        let mut rx = oracle.events().subscribe();
        let ops = Principal::new("ops");

        let err = oracle.set_max_window_size(&ops, 400).expect_err("not above window");
        assert!(matches!(err, OracleError::InvalidParameter { name: "max_window_size", .. }));
        assert_eq!(oracle.max_window_size(), 800);

        oracle.set_max_window_size(&ops, 401).expect("valid");
        assert_eq!(oracle.max_window_size(), 401);
        assert_eq!(
            rx.try_recv().expect("event"),
            OracleEvent::ConfigChanged {
                parameter: "max_window_size".to_string(),
                value: "401".to_string(),
            }
        );
    }

    #[test]
    fn test_set_stale_threshold() {
        let mut oracle = admin_oracle();
        let ops = Principal::new("ops");
        let err = oracle.set_stale_threshold(&ops, 1).expect_err("too small");
        assert!(matches!(err, OracleError::InvalidParameter { .. }));
        oracle.set_stale_threshold(&ops, 120).expect("valid");
        assert_eq!(oracle.stale_threshold(), 120);
    }

    #[test]
    fn test_unauthorized_admin_calls() {
        let mut oracle = admin_oracle();
        let mut rx = oracle.events().subscribe();
        let mallory = Principal::new("mallory");

        let err = oracle.set_max_window_size(&mallory, 900).expect_err("unauthorized");
        assert!(matches!(err, OracleError::Unauthorized(ref p) if p == "mallory"));
        assert!(oracle.set_stale_threshold(&mallory, 900).is_err());
        assert!(oracle
            .set_price_source(&mallory, Arc::new(FixedSource::new(1, 0)))
            .is_err());

        assert_eq!(oracle.max_window_size(), 800);
        assert_eq!(oracle.source().describe(), "scripted:test");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_set_price_source() {
        let mut oracle = admin_oracle();
        let ops = Principal::new("ops");
        oracle
            .set_price_source(&ops, Arc::new(FixedSource::new(25, 0)))
            .expect("authorized");
        assert_eq!(oracle.source().describe(), "fixed:25");

        let average = oracle.update_result(T0).expect("update from new source");
        assert_eq!(average, 25);
    }
}
