//! Income and expense transactions and the calls that read and write them.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    backend::{Collection, DataStore, Filter, Select, Session, parse_rows},
    ledger::period::DateRange,
};

/// The date format used by the data API and in forms, e.g. "2025-01-31".
pub const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Whether money came in or went out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[default]
    Expense,
    Income,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Expense, TransactionType::Income];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Expense => "Expense",
            TransactionType::Income => "Income",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of categories a transaction can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Food,
    Transport,
    Bills,
    Shopping,
    Fun,
    Salary,
    Bonus,
    Gift,
    Freelance,
    Other,
}

impl Category {
    pub const EXPENSE: [Category; 6] = [
        Category::Food,
        Category::Transport,
        Category::Bills,
        Category::Shopping,
        Category::Fun,
        Category::Other,
    ];

    pub const INCOME: [Category; 5] = [
        Category::Salary,
        Category::Bonus,
        Category::Gift,
        Category::Freelance,
        Category::Other,
    ];

    /// The categories that may be used with `type_`.
    pub fn for_type(type_: TransactionType) -> &'static [Category] {
        match type_ {
            TransactionType::Expense => &Self::EXPENSE,
            TransactionType::Income => &Self::INCOME,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Bills => "Bills",
            Category::Shopping => "Shopping",
            Category::Fun => "Fun",
            Category::Salary => "Salary",
            Category::Bonus => "Bonus",
            Category::Gift => "Gift",
            Category::Freelance => "Freelance",
            Category::Other => "Other",
        }
    }

    /// Find the category named `text` among those allowed for `type_`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCategory] if `type_` does not list `text`.
    pub fn parse(text: &str, type_: TransactionType) -> Result<Category, Error> {
        Self::for_type(type_)
            .iter()
            .copied()
            .find(|category| category.as_str() == text)
            .ok_or_else(|| Error::InvalidCategory {
                category: text.to_owned(),
                type_: type_.as_str().to_lowercase(),
            })
    }
}

/// A transaction as stored in the `expenses` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    #[serde(with = "iso_date")]
    pub expense_date: Date,
    pub item: String,
    pub amount: f64,
    /// Kept as text so rows written by other clients still load.
    pub category: String,
    #[serde(rename = "type")]
    pub type_: TransactionType,
}

/// The raw values entered in the add-transaction form.
#[derive(Debug, Clone, Default)]
pub struct TransactionInput<'a> {
    pub type_: TransactionType,
    pub date: &'a str,
    pub item: &'a str,
    pub amount: &'a str,
    pub category: &'a str,
}

/// A checked transaction that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub expense_date: Date,
    pub item: String,
    pub amount: f64,
    pub category: Category,
    pub type_: TransactionType,
}

impl NewTransaction {
    /// Check the form values.
    ///
    /// # Errors
    ///
    /// - [Error::MissingItemOrAmount] if the item or amount is blank.
    /// - [Error::InvalidAmount] if the amount is not a number greater than zero.
    /// - [Error::InvalidCategory] if the category does not belong to the type.
    /// - [Error::InvalidDate] if the date is not a valid ISO date.
    pub fn validate(input: TransactionInput<'_>) -> Result<Self, Error> {
        let item = input.item.trim();
        let amount_text = input.amount.trim();

        if item.is_empty() || amount_text.is_empty() {
            return Err(Error::MissingItemOrAmount);
        }

        let amount = amount_text
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .ok_or_else(|| Error::InvalidAmount(amount_text.to_owned()))?;

        let category = Category::parse(input.category, input.type_)?;

        let expense_date = Date::parse(input.date.trim(), ISO_DATE)
            .map_err(|_| Error::InvalidDate(input.date.to_owned()))?;

        Ok(Self {
            expense_date,
            item: item.to_owned(),
            amount,
            category,
            type_: input.type_,
        })
    }
}

#[derive(Serialize)]
struct TransactionRow<'a> {
    user_id: &'a str,
    #[serde(with = "iso_date")]
    expense_date: Date,
    item: &'a str,
    amount: f64,
    category: &'static str,
    #[serde(rename = "type")]
    type_: TransactionType,
}

/// Fetch the user's transactions dated within `range`, newest first.
pub async fn get_transactions(
    store: &dyn DataStore,
    session: &Session,
    range: DateRange,
) -> Result<Vec<Transaction>, Error> {
    let query = Select::from(Collection::Expenses)
        .filter(Filter::eq("user_id", &session.user.id))
        .filter(Filter::gte("expense_date", range.start))
        .filter(Filter::lt("expense_date", range.end))
        .order_desc("expense_date");

    parse_rows(store.select(session, &query).await?)
}

/// Save `transaction` for the signed-in user.
pub async fn create_transaction(
    store: &dyn DataStore,
    session: &Session,
    transaction: &NewTransaction,
) -> Result<(), Error> {
    let row = TransactionRow {
        user_id: &session.user.id,
        expense_date: transaction.expense_date,
        item: &transaction.item,
        amount: transaction.amount,
        category: transaction.category.as_str(),
        type_: transaction.type_,
    };
    let row = serde_json::to_value(row)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    store.insert(session, Collection::Expenses, row).await
}

/// Delete the signed-in user's transaction with `id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingTransaction] if the user has no such transaction.
pub async fn delete_transaction(
    store: &dyn DataStore,
    session: &Session,
    id: i64,
) -> Result<(), Error> {
    let deleted = store
        .delete(
            session,
            Collection::Expenses,
            &[Filter::eq("id", id), Filter::eq("user_id", &session.user.id)],
        )
        .await?;

    match deleted {
        0 => Err(Error::DeleteMissingTransaction),
        _ => Ok(()),
    }
}
