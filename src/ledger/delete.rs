use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRefresh;

use crate::{
    backend::Session,
    ledger::{LedgerState, transaction::delete_transaction},
};

/// A route handler for deleting one of the user's transactions.
///
/// On success the client refreshes the page so the totals are recalculated.
pub async fn delete_transaction_endpoint(
    State(state): State<LedgerState>,
    Extension(session): Extension<Session>,
    Path(transaction_id): Path<i64>,
) -> Response {
    match delete_transaction(state.store.as_ref(), &session, transaction_id).await {
        Ok(()) => (HxRefresh(true), StatusCode::OK).into_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
