//! Alerts for showing error messages to users.
//!
//! Alerts are swapped into the `#alert-container` element that every page
//! renders, usually via `hx-target-error` for error responses.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

const ALERT_STYLE: &str = "flex items-start p-4 mb-4 text-red-800 border border-red-300 \
    rounded-lg bg-red-50 dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

/// A dismissible message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (message, details) = match self {
            Alert::Error { message, details } => (message, Some(details)),
            Alert::ErrorSimple { message } => (message, None),
        };

        // Template adapted from https://flowbite.com/docs/components/alerts/
        html! {
            div class=(ALERT_STYLE) role="alert"
            {
                div class="flex-1"
                {
                    p class="font-medium" { (message) }

                    @if let Some(details) = details.filter(|details| !details.is_empty()) {
                        p class="mt-1 text-sm" { (details) }
                    }
                }

                button
                    type="button"
                    class="ms-4 text-sm font-semibold"
                    aria-label="Dismiss"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "✕"
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
