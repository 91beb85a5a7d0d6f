//! Authentication middleware that validates the session cookie, refreshes
//! expired access tokens, extends sessions and handles redirects.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState,
    auth::{
        SessionEvent, SessionEvents,
        cookie::{
            SessionToken, extend_session_cookie, get_token_from_cookies,
            invalidate_session_cookie,
        },
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    backend::AuthProvider,
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How far each request pushes back the expiry of the session cookie.
    pub cookie_duration: Duration,
    /// Used to refresh expired access tokens.
    pub auth: Arc<dyn AuthProvider>,
    pub session_events: SessionEvents,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            auth: state.auth.clone(),
            session_events: state.session_events.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Swap an access token that is about to expire for a fresh one.
///
/// Returns `None` if the auth provider refused the refresh token.
async fn refresh_if_needed(state: &AuthState, token: SessionToken) -> Option<SessionToken> {
    if !token.session.needs_refresh(OffsetDateTime::now_utc()) {
        return Some(token);
    }

    match state.auth.refresh(&token.session.refresh_token).await {
        Ok(session) => {
            state
                .session_events
                .publish(SessionEvent::Refreshed(session.user.email.clone()));

            Some(SessionToken {
                session,
                expires_at: token.expires_at,
            })
        }
        Err(error) => {
            tracing::warn!("Could not refresh session: {error}");
            state.session_events.publish(SessionEvent::Expired);

            None
        }
    }
}

/// Checks for a valid session cookie. The session is placed into the request
/// and the request executed normally if the cookie is valid, otherwise
/// `get_redirect` is used to send the user to the log-in page.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        if request.uri().path().starts_with("/api") {
            tracing::warn!(
                "Missing or invalid HTMX headers for /api request. Falling back to expenses."
            );
        } else {
            tracing::warn!("Invalid redirect URL from request URI. Falling back to expenses.");
        }

        build_log_in_redirect_url_from_target(endpoints::EXPENSES_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return get_redirect(&log_in_redirect_url);
        }
    };
    let token = match get_token_from_cookies(&jar) {
        Ok(token) => token,
        Err(_) => return get_redirect(&log_in_redirect_url),
    };
    let Some(token) = refresh_if_needed(&state, token).await else {
        return (
            invalidate_session_cookie(jar),
            get_redirect(&log_in_redirect_url),
        )
            .into_response();
    };

    parts.extensions.insert(token.session.clone());
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_session_cookie(jar.clone(), token, state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware function that checks for a valid session cookie.
/// The session is placed into the request and the request executed normally
/// if the cookie is valid, otherwise a redirect to the log-in page is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session): Extension<Session>` to receive the session.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Like [auth_guard], but returns an htmx redirect so that requests made by
/// htmx navigate the whole page to the log-in page.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
