//! Core business logic - framework-agnostic ledger storage, totals and balance curves.

/// Append-only CSV record log
pub mod ledger;
/// Text formatting for history and totals
pub mod report;
/// Income/expense/balance totals
pub mod summary;
/// Per-period cumulative balance curves
pub mod timeseries;

pub use ledger::{Clock, CsvLedger, SharedLedger, SystemClock, lock_ledger};
pub use summary::{Summary, summarize};
pub use timeseries::{BalancePoint, BucketKey, Period, aggregate_balance, aggregate_balance_by_name};
