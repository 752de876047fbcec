//! Entity module - the data types persisted in the ledger log.

pub mod record;

pub use record::{DEFAULT_DESCRIPTION, Kind, Record, TIMESTAMP_FORMAT};
