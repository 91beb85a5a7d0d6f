//! Totals and per-month buckets for the expenses page.

use crate::ledger::{
    period::MONTH_LABELS,
    transaction::{Transaction, TransactionType},
};

/// Income and expense totals over a set of transactions.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
}

impl Totals {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .fold(Totals::default(), |mut totals, transaction| {
                totals.add(transaction);
                totals
            })
    }

    fn add(&mut self, transaction: &Transaction) {
        match transaction.type_ {
            TransactionType::Income => self.income += transaction.amount,
            TransactionType::Expense => self.expense += transaction.amount,
        }
    }

    /// Income minus expenses.
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }

    /// The share of income that was not spent as a percentage, or zero when
    /// there was no income.
    pub fn savings_rate(&self) -> f64 {
        if self.income > 0.0 {
            self.balance() / self.income * 100.0
        } else {
            0.0
        }
    }
}

/// The totals for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthBucket {
    pub label: &'static str,
    pub totals: Totals,
}

/// Group `transactions` into twelve buckets, January to December, by the
/// month of their date.
pub fn monthly_buckets(transactions: &[Transaction]) -> [MonthBucket; 12] {
    let mut buckets = MONTH_LABELS.map(|label| MonthBucket {
        label,
        totals: Totals::default(),
    });

    for transaction in transactions {
        let index = transaction.expense_date.month() as usize - 1;
        buckets[index].totals.add(transaction);
    }

    buckets
}
