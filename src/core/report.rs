//! Report formatting business logic.
//!
//! Turns records and summaries into the plain-text blocks the bot replies with.
//! Nothing here knows about Discord; the bot layer only adds the message framing.

use crate::{
    core::summary::Summary,
    entities::{Record, TIMESTAMP_FORMAT},
};
use std::fmt::Write as _;

/// Number of entries `/history` shows when nothing else is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// The last `limit` records, oldest first.
#[must_use]
pub fn recent(records: &[Record], limit: usize) -> &[Record] {
    &records[records.len().saturating_sub(limit)..]
}

/// Formats one history line: `2024-03-05 12:30:00 | expense 400 (food)`.
#[must_use]
pub fn format_history_line(record: &Record) -> String {
    format!(
        "{} | {} {} ({})",
        record.timestamp.format(TIMESTAMP_FORMAT),
        record.kind,
        record.amount,
        record.description
    )
}

/// One line per record, each terminated by a newline.
#[must_use]
pub fn format_history(records: &[Record]) -> String {
    records.iter().fold(String::new(), |mut out, record| {
        let _ = writeln!(out, "{}", format_history_line(record));
        out
    })
}

/// Three-line income/expense/balance block.
#[must_use]
pub fn format_summary(summary: &Summary) -> String {
    format!(
        "📥 Income: {}\n📤 Expense: {}\n💰 Balance: {}",
        summary.income, summary.expense, summary.balance
    )
}
