//! Log-out route handler that ends the backend session, deletes the session
//! cookie and redirects users.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{
        SessionEvent,
        cookie::{get_token_from_cookies, invalidate_session_cookie},
        log_in::LoginState,
    },
    endpoints,
};

/// Sign out with the auth provider, invalidate the session cookie and
/// redirect the client to the log-in page.
///
/// The cookie is deleted even if the auth provider cannot be reached.
pub async fn get_log_out(State(state): State<LoginState>, jar: PrivateCookieJar) -> Response {
    if let Ok(token) = get_token_from_cookies(&jar) {
        if let Err(error) = state.auth.sign_out(&token.session).await {
            tracing::warn!("Could not sign out with the auth provider: {error}");
        }

        state
            .session_events
            .publish(SessionEvent::SignedOut(token.session.user.email));
    }

    (
        invalidate_session_cookie(jar),
        Redirect::to(endpoints::LOG_IN_VIEW),
    )
        .into_response()
}
