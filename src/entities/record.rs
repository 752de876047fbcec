//! Record entity - one immutable income or expense entry of the ledger log.
//!
//! Field order matches the column order of the persisted log:
//! `user_id, kind, amount, description, timestamp`.

use crate::errors::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Format of the `timestamp` column (naive local time, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Placeholder stored when no description is given.
pub const DEFAULT_DESCRIPTION: &str = "-";

/// Direction of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Kind {
    /// Money coming in
    Income,
    /// Money going out
    Expense,
}

impl Kind {
    /// Literal used in the log file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(Error::InvalidKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Kind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A single ledger entry as stored in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Chat user ID that owns the record
    pub user_id: String,
    /// Income or expense
    pub kind: Kind,
    /// Amount in the smallest currency unit
    pub amount: u64,
    /// Free-text note, `-` when none was given
    pub description: String,
    /// When the store wrote the record
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
}

impl Record {
    /// Builds a record, substituting the placeholder for a missing or blank description.
    ///
    /// Any other description is stored exactly as given.
    #[must_use]
    pub fn new(
        user_id: &str,
        kind: Kind,
        amount: u64,
        description: Option<&str>,
        timestamp: NaiveDateTime,
    ) -> Self {
        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION);

        Self {
            user_id: user_id.to_string(),
            kind,
            amount,
            description: description.to_string(),
            timestamp,
        }
    }

    /// `+amount` for income, `-amount` for expense.
    #[must_use]
    pub fn signed_amount(&self) -> i128 {
        let amount = i128::from(self.amount);
        match self.kind {
            Kind::Income => amount,
            Kind::Expense => -amount,
        }
    }
}

/// Serde adapter for the `YYYY-MM-DD HH:MM:SS` column.
pub(crate) mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(D::Error::custom)
    }
}
