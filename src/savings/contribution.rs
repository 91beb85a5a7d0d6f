//! Endpoints for adding and deleting contributions.

use axum::{
    Extension,
    extract::{Path, State},
    response::Response,
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::{
    Error,
    backend::Session,
    savings::{
        SavingsState,
        connection::get_connection,
        refresh_or_alert,
        saving::{add_saving, delete_saving, parse_amount},
    },
};

#[derive(Debug, Deserialize)]
pub struct SavingForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub note: String,
}

async fn add(state: &SavingsState, session: &Session, form: &SavingForm) -> Result<(), Error> {
    let amount = parse_amount(&form.amount)?;
    let connection = get_connection(state.store.as_ref(), session).await?;

    add_saving(
        state.store.as_ref(),
        session,
        connection.as_ref(),
        amount,
        &form.note,
    )
    .await
}

/// Add a contribution made today by the signed-in user.
pub async fn add_saving_endpoint(
    State(state): State<SavingsState>,
    Extension(session): Extension<Session>,
    Form(form): Form<SavingForm>,
) -> Response {
    refresh_or_alert(add(&state, &session, &form).await, "add contribution")
}

/// Delete one of the signed-in user's own contributions.
pub async fn delete_saving_endpoint(
    State(state): State<SavingsState>,
    Extension(session): Extension<Session>,
    Path(saving_id): Path<i64>,
) -> Response {
    refresh_or_alert(
        delete_saving(state.store.as_ref(), &session, saving_id).await,
        "delete contribution",
    )
}
