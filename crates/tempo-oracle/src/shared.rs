//! Thread-safe handle to a [`TwapOracle`].
//!
//! Updates and admin mutations hold the write lock for their whole duration,
//! so they never interleave with each other. Reads share the read lock and
//! only ever see the state as of the last committed update.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::auth::Principal;
use crate::oracle::{OracleSnapshot, TwapOracle};
use crate::source::PriceSource;
use crate::{OracleError, Result};

/// Cloneable, shareable oracle handle.
#[derive(Debug, Clone)]
pub struct SharedOracle {
    inner: Arc<RwLock<TwapOracle>>,
}

impl SharedOracle {
    /// Wrap an oracle for shared use.
    pub fn new(oracle: TwapOracle) -> Self {
        Self {
            inner: Arc::new(RwLock::new(oracle)),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<'_, TwapOracle>> {
        self.inner.read().map_err(|_| OracleError::LockPoisoned)
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, TwapOracle>> {
        self.inner.write().map_err(|_| OracleError::LockPoisoned)
    }

    /// See [`TwapOracle::update_result`].
    pub fn update_result(&self, now: u64) -> Result<u128> {
        self.write_lock()?.update_result(now)
    }

    /// See [`TwapOracle::read`].
    pub fn read(&self, now: u64) -> Result<u128> {
        self.read_lock()?.read(now)
    }

    /// See [`TwapOracle::read_with_validity`].
    ///
    /// A poisoned lock reports `(0, false)`.
    pub fn read_with_validity(&self, now: u64) -> (u128, bool) {
        self.read_lock()
            .map(|oracle| oracle.read_with_validity(now))
            .unwrap_or((0, false))
    }

    /// Consistent copy of the oracle state.
    pub fn snapshot(&self) -> Result<OracleSnapshot> {
        Ok(self.read_lock()?.snapshot())
    }

    /// See [`TwapOracle::is_stale`].
    pub fn is_stale(&self, now: u64) -> Result<bool> {
        Ok(self.read_lock()?.is_stale(now))
    }

    /// See [`TwapOracle::set_max_window_size`].
    pub fn set_max_window_size(&self, principal: &Principal, value: u64) -> Result<()> {
        self.write_lock()?.set_max_window_size(principal, value)
    }

    /// See [`TwapOracle::set_stale_threshold`].
    pub fn set_stale_threshold(&self, principal: &Principal, value: u64) -> Result<()> {
        self.write_lock()?.set_stale_threshold(principal, value)
    }

    /// See [`TwapOracle::set_price_source`].
    pub fn set_price_source(
        &self,
        principal: &Principal,
        source: Arc<dyn PriceSource>,
    ) -> Result<()> {
        self.write_lock()?.set_price_source(principal, source)
    }

    /// Run `f` against the oracle under the read lock.
    pub fn with<R>(&self, f: impl FnOnce(&TwapOracle) -> R) -> Result<R> {
        Ok(f(&*self.read_lock()?))
    }
}
