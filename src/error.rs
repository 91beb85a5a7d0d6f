//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError};

/// The errors that may occur in the application.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// The auth provider rejected the request, e.g. wrong password or an
    /// email that is already registered.
    ///
    /// The message comes from the provider and is shown to the user as is.
    #[error("{0}")]
    AuthFailed(String),

    /// The data API rejected the request.
    ///
    /// The message comes from the backend and is shown to the user as is.
    #[error("{0}")]
    Backend(String),

    /// The backend could not be reached or sent a malformed response.
    #[error("could not reach the backend: {0}")]
    Transport(String),

    /// A row returned by the backend did not have the expected shape.
    #[error("could not read a row from the backend: {0}")]
    InvalidRow(String),

    /// The access token expired and could not be refreshed.
    #[error("your session has expired")]
    SessionExpired,

    /// The session cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The text entered is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A transaction was submitted without an item name or amount.
    #[error("Please fill in both Item Name and Amount.")]
    MissingItemOrAmount,

    /// An amount was zero, negative or not a number.
    #[error("\"{0}\" is not a valid amount, enter a number greater than zero")]
    InvalidAmount(String),

    /// A date could not be parsed.
    #[error("\"{0}\" is not a valid date")]
    InvalidDate(String),

    /// The category does not belong to the chosen transaction type.
    #[error("{category} is not a valid {type_} category")]
    InvalidCategory {
        /// The category that was submitted.
        category: String,
        /// The transaction type the category was submitted with.
        type_: String,
    },

    /// The month being exported has no transactions.
    #[error("No transactions to export for this period.")]
    NothingToExport,

    /// The CSV export could not be written.
    #[error("could not write the CSV export: {0}")]
    CsvError(String),

    /// A user tried to invite themselves as their partner.
    #[error("you cannot invite yourself")]
    SelfInvite,

    /// A user that is already linked or has a pending invite tried to send
    /// another invite.
    #[error("you are already connected or have a pending invite")]
    AlreadyConnected,

    /// The invited email does not belong to a registered user.
    #[error("no user is registered with the email {0}")]
    UnknownPartner(String),

    /// Only the receiver of a pending invite may accept it.
    #[error("only the invited partner can accept this invite")]
    NotInvitee,

    /// The action needs an accepted connection with a partner.
    #[error("you are not connected with a partner")]
    NotConnected,

    /// The savings goal settings are invalid.
    #[error("{0}")]
    InvalidGoal(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that does not exist")]
    DeleteMissingTransaction,

    /// Tried to delete a saving that does not exist or belongs to someone else
    #[error("tried to delete a saving that does not exist")]
    DeleteMissingSaving,

    /// Tried to update a connection that does not exist
    #[error("tried to update a connection that does not exist")]
    UpdateMissingConnection,

    /// Tried to delete a connection that does not exist
    #[error("tried to delete a connection that does not exist")]
    DeleteMissingConnection,
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        tracing::error!("backend request failed: {value}");
        Error::Transport(value.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::CsvError(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::Transport(_) => InternalServerError {
                description: "Could not reach the server",
                fix: "Check your connection and try again.",
            }
            .into_response(),
            Error::Backend(message) => InternalServerError {
                description: "The server rejected the request",
                fix: &message,
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status, alert) = match self {
            Error::AuthFailed(message) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Authentication failed".to_owned(),
                    details: message,
                },
            ),
            Error::Backend(message) => (
                StatusCode::BAD_GATEWAY,
                Alert::Error {
                    message: "The server rejected the request".to_owned(),
                    details: message,
                },
            ),
            Error::Transport(_) => (
                StatusCode::BAD_GATEWAY,
                Alert::Error {
                    message: "Could not reach the server".to_owned(),
                    details: "Check your connection and try again.".to_owned(),
                },
            ),
            Error::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                Alert::Error {
                    message: "Session expired".to_owned(),
                    details: "Log in again to continue.".to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                        ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            error @ (Error::MissingItemOrAmount | Error::NothingToExport) => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: error.to_string(),
                },
            ),
            error @ (Error::InvalidAmount(_)
            | Error::InvalidDate(_)
            | Error::InvalidCategory { .. }
            | Error::InvalidEmail(_)
            | Error::InvalidGoal(_)) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid input".to_owned(),
                    details: capitalize(&error.to_string()),
                },
            ),
            error @ (Error::SelfInvite
            | Error::AlreadyConnected
            | Error::UnknownPartner(_)
            | Error::NotInvitee
            | Error::NotConnected) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not update partner connection".to_owned(),
                    details: capitalize(&error.to_string()),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            Error::DeleteMissingSaving => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete contribution".to_owned(),
                    details: "The contribution could not be found, or it was added by your \
                    partner. You can only delete your own contributions."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingConnection => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update partner connection".to_owned(),
                    details: "The connection could not be found. \
                    Try refreshing the page to see if it has been removed."
                        .to_owned(),
                },
            ),
            Error::DeleteMissingConnection => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not remove partner connection".to_owned(),
                    details: "The connection could not be found. \
                    Try refreshing the page to see if it has already been removed."
                        .to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details: "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                    },
                )
            }
        };

        (status, alert.into_html()).into_response()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
