//! Summary engine - income, expense and balance totals over a set of records.

use crate::entities::{Kind, Record};

/// Totals for one user's records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Sum of all income amounts
    pub income: i128,
    /// Sum of all expense amounts
    pub expense: i128,
    /// `income - expense`, negative when spending exceeds income
    pub balance: i128,
}

impl Summary {
    /// True when there is nothing at all to report or chart.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.income == 0 && self.expense == 0
    }
}

/// Sums income and expense amounts. An empty slice gives all zeros.
#[must_use]
pub fn summarize(records: &[Record]) -> Summary {
    let (income, expense) =
        records
            .iter()
            .fold((0_i128, 0_i128), |(income, expense), record| match record.kind {
                Kind::Income => (income + i128::from(record.amount), expense),
                Kind::Expense => (income, expense + i128::from(record.amount)),
            });

    Summary {
        income,
        expense,
        balance: income - expense,
    }
}
