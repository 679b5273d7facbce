//! Alert system for displaying success and error messages to users.
//!
//! Alerts replace the `#alert-container` element at the bottom of every page
//! with an out-of-band swap, so they can be returned by any HTMX endpoint
//! regardless of the element the request targets.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

const ALERT_CONTAINER_ID: &str = "alert-container";

/// A message to display in the alert container.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    SuccessSimple {
        /// The headline of the alert.
        message: String,
    },
    /// An error message with extra details.
    Error {
        /// The headline of the alert.
        message: String,
        /// Details shown under the headline.
        details: String,
    },
    /// An error message without details.
    ErrorSimple {
        /// The headline of the alert.
        message: String,
    },
}

impl Alert {
    /// Render the alert as an out-of-band replacement for the alert container.
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::SuccessSimple { message } => (false, message, String::new()),
            Alert::Error { message, details } => (true, message, details),
            Alert::ErrorSimple { message } => (true, message, String::new()),
        };

        let style = if is_error {
            "text-red-800 border-red-300 bg-red-50 dark:bg-gray-800 \
            dark:text-red-400 dark:border-red-800"
        } else {
            "text-green-800 border-green-300 bg-green-50 dark:bg-gray-800 \
            dark:text-green-400 dark:border-green-800"
        };

        let alert = html! {
            div
                role="alert"
                class={ "flex items-start justify-between gap-4 p-4 mb-4 text-sm border rounded-lg " (style) }
            {
                div
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="font-bold"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        };

        alert_container(Some(alert))
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}

/// The fixed container that alerts are rendered into.
///
/// Pass `None` for the empty container included in the page layout.
pub fn alert_container(alert: Option<Markup>) -> Markup {
    html! {
        div
            id=(ALERT_CONTAINER_ID)
            hx-swap-oob=[alert.is_some().then_some("true")]
            class="w-full max-w-md px-4"
            style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
        {
            @if let Some(alert) = alert {
                (alert)
            }
        }
    }
}
