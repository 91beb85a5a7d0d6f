//! Creates new accounts with the auth provider.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::auth::{
    SessionEvent, ValidatedPassword,
    forms::{LogInForm, log_in_form, sign_up_form},
    log_in::{LoginState, auth_error_message},
};

pub(crate) const ACCOUNT_CREATED_MSG: &str = "Account created! You can now log in.";
pub(crate) const PASSWORDS_DO_NOT_MATCH_MSG: &str = "Passwords do not match.";

/// The raw data entered by the user in the sign-up form.
#[derive(Clone, Serialize, Deserialize)]
pub struct SignUpData {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Check the form before sending it to the auth provider.
fn validate(data: &SignUpData, email: &str) -> Result<ValidatedPassword, String> {
    if !EmailAddress::is_valid(email) {
        return Err(format!("\"{email}\" is not a valid email address."));
    }

    let password = ValidatedPassword::new(&data.password, email)
        .map_err(|error| capitalize_first(&error.to_string()))?;

    if data.password != data.confirm_password {
        return Err(PASSWORDS_DO_NOT_MATCH_MSG.to_owned());
    }

    Ok(password)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Handler for sign-up requests via the POST method.
///
/// On success the log-in form is returned with the email filled in.
/// Otherwise the sign-up form is returned with an error message.
pub async fn post_sign_up(
    State(state): State<LoginState>,
    Form(data): Form<SignUpData>,
) -> Response {
    let email = data.email.trim();

    let password = match validate(&data, email) {
        Ok(password) => password,
        Err(message) => return sign_up_form(email, Some(&message)).into_response(),
    };

    if let Err(error) = state.auth.sign_up(email, password.as_str()).await {
        let message = auth_error_message(&error);
        return sign_up_form(email, Some(&message)).into_response();
    }

    tracing::info!("Created account for {email}");
    state
        .session_events
        .publish(SessionEvent::SignedUp(email.to_owned()));

    log_in_form(LogInForm {
        email,
        notice: Some(ACCOUNT_CREATED_MSG),
        ..Default::default()
    })
    .into_response()
}
