//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Balance and share charts
pub mod chart;

/// Start/help commands
pub mod general;

/// Totals, history, export and reset
pub mod report;

/// Income and expense entry commands
pub mod transaction;

// Export commands
pub use chart::*;
pub use general::*;
pub use report::*;
pub use transaction::*;

use crate::{bot::BotData, errors::Error};

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        start(),
        help(),
        income(),
        expense(),
        total(),
        history(),
        export(),
        reset(),
        chart(),
        balance_chart(),
    ]
}
