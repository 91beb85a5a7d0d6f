//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

/// The root route which redirects to the expenses page.
pub const ROOT: &str = "/";
/// The expense ledger, the landing page for logged in users.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The joint savings page.
pub const MARRIAGE_VIEW: &str = "/marriage";
/// The route for getting the log in and sign up page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The CSV download of a month of transactions.
pub const EXPORT_DOWNLOAD: &str = "/transactions/export";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for creating a new account.
pub const SIGN_UP_API: &str = "/api/sign_up";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route that returns the category select for a transaction type.
pub const TRANSACTION_CATEGORIES: &str = "/api/transactions/categories";
/// The route that checks a month has transactions before downloading the CSV.
pub const EXPORT_API: &str = "/api/transactions/export";
/// The route to invite a partner.
pub const CONNECTIONS_API: &str = "/api/connections";
/// The route to cancel, decline or disconnect a partner link.
pub const CONNECTION: &str = "/api/connections/{connection_id}";
/// The route for the invited partner to accept an invite.
pub const ACCEPT_CONNECTION: &str = "/api/connections/{connection_id}/accept";
/// The route to update the shared savings goal.
pub const CONNECTION_GOAL: &str = "/api/connections/{connection_id}/goal";
/// The route to add a savings contribution.
pub const SAVINGS_API: &str = "/api/savings";
/// The route to delete a savings contribution.
pub const SAVING: &str = "/api/savings/{saving_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/savings/{saving_id}', '{saving_id}' is the parameter.
///
/// Only the first parameter is replaced. If no parameter is found, the
/// function returns `endpoint_path` unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::MARRIAGE_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EXPORT_DOWNLOAD);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::SIGN_UP_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION_CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::EXPORT_API);
        assert_endpoint_is_valid_uri(endpoints::CONNECTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::SAVINGS_API);

        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::TRANSACTION, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::CONNECTION, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::ACCEPT_CONNECTION, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::CONNECTION_GOAL, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::SAVING, 1));
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::ACCEPT_CONNECTION, 42);

        assert_eq!(formatted_path, "/api/connections/42/accept");
    }
}
