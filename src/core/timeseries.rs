//! Time-series aggregator - turns a flat record list into a per-period balance curve.
//!
//! Records are grouped into calendar buckets derived from their naive timestamps,
//! each bucket's signed amounts are summed, and the bucket deltas are accumulated
//! in chronological order. Only buckets holding at least one record appear.
//!
//! Bucket boundaries follow the naive local time the record was written with;
//! no time zone conversion happens here.

use crate::{
    entities::Record,
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Granularity of a balance curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Period {
    /// Calendar day
    Day,
    /// ISO week (Monday to Sunday)
    Week,
    /// Calendar month
    Month,
    /// Calendar year
    Year,
}

impl Period {
    /// All supported periods, finest first.
    pub const ALL: [Self; 4] = [Self::Day, Self::Week, Self::Month, Self::Year];

    /// Lowercase name accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// The bucket `timestamp` falls into at this granularity.
    #[must_use]
    pub fn bucket_key(self, timestamp: NaiveDateTime) -> BucketKey {
        let date = timestamp.date();
        match self {
            Self::Day => BucketKey::Day(date),
            Self::Week => {
                let week = date.iso_week();
                BucketKey::Week {
                    year: week.year(),
                    week: week.week(),
                }
            }
            Self::Month => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
            Self::Year => BucketKey::Year(date.year()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|period| period.name() == wanted)
            .ok_or_else(|| Error::InvalidPeriod {
                period: s.to_string(),
            })
    }
}

/// Identifier of one calendar bucket.
///
/// Keys of the same period order chronologically; a single curve never mixes periods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    /// A calendar date
    Day(NaiveDate),
    /// An ISO week, `year` being the ISO week-numbering year
    Week {
        /// ISO week-numbering year
        year: i32,
        /// Week number, 1 to 53
        week: u32,
    },
    /// A calendar month
    Month {
        /// Calendar year
        year: i32,
        /// Month, 1 to 12
        month: u32,
    },
    /// A calendar year
    Year(i32),
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Week { year, week } => write!(f, "{year}-W{week:02}"),
            Self::Month { year, month } => write!(f, "{year}-{month:02}"),
            Self::Year(year) => write!(f, "{year}"),
        }
    }
}

/// One point of a balance curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalancePoint {
    /// Bucket this point closes
    pub key: BucketKey,
    /// Net income minus expense inside the bucket
    pub delta: i128,
    /// Balance at the end of the bucket
    pub balance: i128,
}

/// Cumulative balance per bucket, in ascending key order.
///
/// The input order does not matter. The last point's balance equals the
/// overall balance of `records`; empty input gives an empty curve.
#[must_use]
pub fn aggregate_balance(records: &[Record], period: Period) -> Vec<BalancePoint> {
    let mut deltas: BTreeMap<BucketKey, i128> = BTreeMap::new();
    for record in records {
        *deltas.entry(period.bucket_key(record.timestamp)).or_default() += record.signed_amount();
    }

    deltas
        .into_iter()
        .scan(0_i128, |running, (key, delta)| {
            *running += delta;
            Some(BalancePoint {
                key,
                delta,
                balance: *running,
            })
        })
        .collect()
}

/// Like [`aggregate_balance`], with the period given by name (`day`, `week`, `month`, `year`).
///
/// # Errors
///
/// Returns `Error::InvalidPeriod` for any other name.
pub fn aggregate_balance_by_name(records: &[Record], period: &str) -> Result<Vec<BalancePoint>> {
    let period = period.parse::<Period>()?;
    Ok(aggregate_balance(records, period))
}
