//! Endpoints for inviting a partner, answering an invite, unlinking and
//! setting the shared goal.

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
    backend::Session,
    savings::{
        SavingsState,
        connection::{Goal, accept_invite, remove_connection, send_invite, update_goal},
        refresh_or_alert,
    },
};

#[derive(Debug, Deserialize)]
pub struct InviteForm {
    #[serde(default)]
    pub partner_email: String,
}

/// Invite a partner by email.
pub async fn send_invite_endpoint(
    State(state): State<SavingsState>,
    Extension(session): Extension<Session>,
    Form(form): Form<InviteForm>,
) -> Response {
    let result = send_invite(state.store.as_ref(), &session, &form.partner_email).await;

    if result.is_ok() {
        tracing::info!("{} invited {}", session.user.email, form.partner_email.trim());
    }

    refresh_or_alert(result, "send invite")
}

/// Accept the pending invite `connection_id`.
pub async fn accept_invite_endpoint(
    State(state): State<SavingsState>,
    Extension(session): Extension<Session>,
    Path(connection_id): Path<i64>,
) -> Response {
    refresh_or_alert(
        accept_invite(state.store.as_ref(), &session, connection_id).await,
        "accept invite",
    )
}

/// Cancel, decline or unlink the connection `connection_id`.
pub async fn remove_connection_endpoint(
    State(state): State<SavingsState>,
    Extension(session): Extension<Session>,
    Path(connection_id): Path<i64>,
) -> Response {
    refresh_or_alert(
        remove_connection(state.store.as_ref(), &session, connection_id).await,
        "remove connection",
    )
}

#[derive(Debug, Deserialize)]
pub struct GoalForm {
    #[serde(default)]
    pub target_amount: String,
    #[serde(default)]
    pub monthly_goal: String,
}

/// Set the target amount and monthly goal of the connection `connection_id`.
pub async fn update_goal_endpoint(
    State(state): State<SavingsState>,
    Extension(session): Extension<Session>,
    Path(connection_id): Path<i64>,
    Form(form): Form<GoalForm>,
) -> Response {
    let result = match Goal::parse(&form.target_amount, &form.monthly_goal) {
        Ok(goal) => update_goal(state.store.as_ref(), &session, connection_id, goal).await,
        Err(error) => Err(error),
    };

    refresh_or_alert(result, "update goal")
}
