//! The expenses page: a user's income and expense transactions for a month or
//! year, with totals, a yearly chart, create and delete, and CSV export.

mod aggregation;
mod cards;
mod charts;
mod delete;
mod export;
mod form;
mod page;
mod period;
mod transaction;

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{AppState, backend::DataStore};

pub use delete::delete_transaction_endpoint;
pub use export::{export_check_endpoint, export_download_endpoint};
pub use form::{create_transaction_endpoint, get_category_select};
pub use page::get_expenses_page;
pub(crate) use transaction::ISO_DATE;

/// The state needed by the expenses page and its endpoints.
#[derive(Clone)]
pub struct LedgerState {
    /// Where transactions are read from and written to.
    pub store: Arc<dyn DataStore>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
