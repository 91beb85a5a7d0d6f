//! The log-in page and the handler that signs users in with the auth provider.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        SessionEvent, SessionEvents,
        cookie::{invalidate_session_cookie, set_session_cookie},
        forms::{LogInForm, log_in_form, sign_up_form},
        redirect::normalize_redirect_url,
    },
    backend::AuthProvider,
    endpoints,
    html::{auth_card, base},
};

/// Shown when the auth provider could not be reached.
pub(crate) const TRANSPORT_ERROR_MSG: &str = "Could not reach the server. Please try again later.";
/// Shown for any other unexpected failure.
pub(crate) const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// The message to show under an auth form for a failed auth request.
///
/// Messages from the auth provider, e.g. "Invalid login credentials", are
/// shown as is.
pub(crate) fn auth_error_message(error: &Error) -> String {
    match error {
        Error::AuthFailed(message) => message.clone(),
        Error::Transport(_) => TRANSPORT_ERROR_MSG.to_owned(),
        error => {
            tracing::error!("Unhandled error while authenticating: {error}");
            INTERNAL_ERROR_MSG.to_owned()
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

/// Which form the log-in page shows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    #[default]
    LogIn,
    SignUp,
}

#[derive(Deserialize)]
pub struct LogInQuery {
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub mode: AuthMode,
}

/// Display the log-in page, or the sign-up page if `mode=sign_up`.
pub async fn get_log_in_page(Query(query): Query<LogInQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");

    let (title, form_title, form) = match query.mode {
        AuthMode::LogIn => (
            "Log In",
            "Log in to your account",
            log_in_form(LogInForm {
                redirect_url: redirect_url.as_deref(),
                ..Default::default()
            }),
        ),
        AuthMode::SignUp => ("Sign Up", "Create an account", sign_up_form("", None)),
    };

    let content = auth_card(form_title, &form);
    base(title, &[], &content).into_response()
}

/// How long the session cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to log users in and out.
#[derive(Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub auth: Arc<dyn AuthProvider>,
    pub session_events: SessionEvents,
}

impl FromRef<AppState> for LoginState {
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
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    pub email: String,

    /// Checked by the auth provider, so it is not validated here.
    pub password: String,

    /// Whether to extend the initial session cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the session cookie is set and the client
/// is redirected to the requested page or the expenses page. Otherwise, the
/// form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let email = user_data.email.trim();

    let session = match state.auth.sign_in(email, &user_data.password).await {
        Ok(session) => session,
        Err(error) => {
            let message = auth_error_message(&error);

            return log_in_form(LogInForm {
                email,
                error_message: Some(&message),
                notice: None,
                redirect_url,
            })
            .into_response();
        }
    };

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };
    let signed_in_email = session.user.email.clone();
    let redirect_url = redirect_url.unwrap_or(endpoints::EXPENSES_VIEW);

    match set_session_cookie(jar.clone(), session, cookie_duration) {
        Ok(updated_jar) => {
            state
                .session_events
                .publish(SessionEvent::SignedIn(signed_in_email));

            (
                StatusCode::SEE_OTHER,
                HxRedirect(redirect_url.to_owned()),
                updated_jar,
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!("Error setting session cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_session_cookie(jar),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
pub(crate) fn test_login_state(auth: Arc<dyn AuthProvider>) -> LoginState {
    LoginState {
        cookie_key: crate::app_state::create_cookie_key("foobar"),
        cookie_duration: crate::auth::cookie::DEFAULT_COOKIE_DURATION,
        auth,
        session_events: SessionEvents::new(),
    }
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::{
        extract::Query,
        http::{StatusCode, header::CONTENT_TYPE},
    };
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{assert_form_input, assert_valid_html, must_get_form, parse_html_document},
    };

    use super::{AuthMode, LogInQuery, get_log_in_page};

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = get_log_in_page(Query(LogInQuery {
            redirect_url: None,
            mode: AuthMode::LogIn,
        }))
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::LOG_IN_API));
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
    }

    #[tokio::test]
    async fn sign_up_mode_displays_sign_up_form() {
        let response = get_log_in_page(Query(LogInQuery {
            redirect_url: None,
            mode: AuthMode::SignUp,
        }))
        .await;

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::SIGN_UP_API));
        assert_form_input(&form, "confirm_password", "password");
    }

    #[tokio::test]
    async fn log_in_page_preserves_redirect_url() {
        let redirect_url = "/expenses?tab=yearly&year=2025".to_string();
        let response = get_log_in_page(Query(LogInQuery {
            redirect_url: Some(redirect_url.clone()),
            mode: AuthMode::LogIn,
        }))
        .await;

        let document = parse_html_document(response).await;
        let inputs = document
            .select(&Selector::parse("input[name=redirect_url]").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(inputs.len(), 1, "want 1 redirect_url input, got {}", inputs.len());
        assert_eq!(inputs[0].value().attr("value"), Some(redirect_url.as_str()));
    }

    #[tokio::test]
    async fn log_in_page_drops_unsafe_redirect_url() {
        let response = get_log_in_page(Query(LogInQuery {
            redirect_url: Some("https://example.com".to_owned()),
            mode: AuthMode::LogIn,
        }))
        .await;

        let document = parse_html_document(response).await;
        let inputs = document
            .select(&Selector::parse("input[name=redirect_url]").unwrap())
            .count();
        assert_eq!(inputs, 0);
    }
}
