//! Shared test utilities for the ledger.
//!
//! This module provides helpers for setting up throwaway ledgers with a
//! controllable clock and building records with sensible defaults.
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use crate::{
    core::ledger::{Clock, CsvLedger},
    entities::{Kind, Record},
    errors::Result,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber (once per test binary).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Builds a naive timestamp, panicking on impossible dates.
#[must_use]
pub fn ts(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, min, sec)
        .unwrap()
}

/// Clock that only moves when a test tells it to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock(Arc<Mutex<NaiveDateTime>>);

impl ManualClock {
    /// Starts the clock at `start`.
    #[must_use]
    pub fn new(start: NaiveDateTime) -> Self {
        Self(Arc::new(Mutex::new(start)))
    }

    /// Jumps to an absolute time, backwards included.
    pub fn set(&self, at: NaiveDateTime) {
        *self.0.lock().unwrap() = at;
    }

    /// Moves forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap()
    }
}

/// Creates a ledger inside a fresh temporary directory, with a manual clock
/// starting at 2024-03-05 12:30:00. The log file itself does not exist yet.
///
/// Keep the returned `TempDir` alive for as long as the ledger is used.
pub fn setup_test_ledger() -> Result<(TempDir, CsvLedger<ManualClock>, ManualClock)> {
    let dir = TempDir::new()?;
    let clock = ManualClock::new(ts(2024, 3, 5, 12, 30, 0));
    let ledger = CsvLedger::with_clock(dir.path().join("ledger.csv"), clock.clone());
    Ok((dir, ledger, clock))
}

/// Record for user `"u"` at the given time, without touching any storage.
#[must_use]
pub fn record_at(kind: Kind, amount: u64, at: NaiveDateTime) -> Record {
    Record::new("u", kind, amount, None, at)
}
