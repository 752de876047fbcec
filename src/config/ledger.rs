//! Ledger storage setup.
//!
//! Opens the CSV log named by the configuration and makes sure it exists with
//! its header before the bot starts taking commands.

use crate::{
    core::ledger::{CsvLedger, SharedLedger},
    errors::Result,
};
use std::path::Path;
use tracing::{info, instrument};

/// Opens the ledger at `path`, creating the file and its parent directories if needed.
///
/// # Errors
/// Returns `Error::Persistence` if the file cannot be created or opened for writing.
#[instrument]
pub fn open_ledger(path: &Path) -> Result<SharedLedger> {
    let ledger = CsvLedger::new(path);
    ledger.init()?;
    info!("Ledger ready at {}", path.display());
    Ok(ledger.into_shared())
}
