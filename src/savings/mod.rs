//! The marriage goal page: linking with a partner and saving towards a
//! shared target.

mod charts;
mod connection;
mod contribution;
mod invite;
mod page;
mod progress;
mod saving;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRefresh;

use crate::{AppState, Error, backend::DataStore};

pub use contribution::{add_saving_endpoint, delete_saving_endpoint};
pub use invite::{
    accept_invite_endpoint, remove_connection_endpoint, send_invite_endpoint, update_goal_endpoint,
};
pub use page::get_marriage_page;

/// The state needed by the marriage goal page and its endpoints.
#[derive(Clone)]
pub struct SavingsState {
    /// Where connections and savings are read from and written to.
    pub store: Arc<dyn DataStore>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for SavingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Refresh the page after a successful change, otherwise show an alert.
fn refresh_or_alert(result: Result<(), Error>, action: &str) -> Response {
    match result {
        Ok(()) => (HxRefresh(true), StatusCode::OK).into_response(),
        Err(error) => {
            tracing::error!("Could not {action}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
fn test_savings_state(store: Arc<crate::test_utils::MemoryStore>) -> SavingsState {
    SavingsState {
        store,
        local_timezone: "Etc/UTC".to_owned(),
    }
}
