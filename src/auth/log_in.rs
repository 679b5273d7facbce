//! This file defines the routes for displaying the client log-in page and handling log-in requests.
//! The cookie module handles the lower level cookie auth logic.

use std::sync::{Arc, LazyLock, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{CookieJar, Form, PrivateCookieJar, Query, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        PasswordHash, ValidatedPassword,
        cookie::{invalidate_auth_cookie, set_auth_cookie, set_logged_in_cookie},
        redirect::normalize_redirect_url,
        token::{ClientSession, Subject},
    },
    client::{Client, get_clients_by_email},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
        log_in_card, password_input,
    },
};

/// The brand shown above the client log-in form.
const LOG_IN_BRAND: &str = "Ledger Admin";

/// The checkbox and submit button shared by the client and admin log-in forms.
pub(super) fn remember_me_and_submit() -> Markup {
    html! {
        div class="flex items-center gap-x-3"
        {
            input
                type="checkbox"
                name="remember_me"
                id="remember_me"
                tabindex="0"
                class="rounded-xs";

            label
                for="remember_me"
                class="block text-sm font-medium text-gray-900 dark:text-white"
            {
                "Keep me logged in for one week"
            }
        }

        button
            type="submit" id="submit-button" tabindex="0"
            class=(BUTTON_PRIMARY_STYLE)
        {
            span class="inline htmx-indicator" id="indicator"
            {
                (loading_spinner())
            }
            "Log in"
        }
    }
}

fn log_in_form(
    email: &str,
    error_message: Option<&str>,
    redirect_url: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="name@example.com"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    value=(email);
            }

            (password_input("", 0, error_message))

            (remember_me_and_submit())
        }
    }
}

pub(super) fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
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

/// Display the client log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_card(LOG_IN_BRAND, "Log in to your account", &log_in_form);
    base("Log In", &content).into_response()
}

/// How long the auth cookie should last if the user selects "remember me" at log-in.
pub(super) const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The message shown for an unknown email and for a wrong password alike.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

pub(super) const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// A hash checked against when no client has the email, so that unknown
/// emails take as long to reject as wrong passwords.
static UNKNOWN_CLIENT_HASH: LazyLock<Option<PasswordHash>> = LazyLock::new(|| {
    PasswordHash::new(
        ValidatedPassword::new_unchecked("unknown client placeholder"),
        PasswordHash::DEFAULT_COST,
    )
    .inspect_err(|error| tracing::error!("could not create placeholder password hash: {error}"))
    .ok()
});

/// Find the client with `email` whose password matches `password`.
///
/// Email addresses are not unique, so each client with the email is tried in turn.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] when no client matches, whether the
/// email is unknown or the password is wrong.
pub fn authenticate_client(
    email: &str,
    password: &str,
    connection: &Connection,
) -> Result<Client, Error> {
    match UNKNOWN_CLIENT_HASH.as_ref() {
        Some(unknown_client_hash) => {
            authenticate_client_with(email, password, unknown_client_hash, connection)
        }
        None => Err(Error::HashingError(
            "missing placeholder password hash".to_owned(),
        )),
    }
}

fn authenticate_client_with(
    email: &str,
    password: &str,
    unknown_client_hash: &PasswordHash,
    connection: &Connection,
) -> Result<Client, Error> {
    let candidates = get_clients_by_email(email.trim(), connection)?;

    if candidates.is_empty() {
        // The result is discarded, only the time spent matters.
        unknown_client_hash
            .verify(password)
            .map_err(|error| Error::HashingError(error.to_string()))?;

        return Err(Error::InvalidCredentials);
    }

    for client in candidates {
        let is_password_valid = client
            .password_hash
            .verify(password)
            .map_err(|error| Error::HashingError(error.to_string()))?;

        if is_password_valid {
            return Ok(client);
        }
    }

    Err(Error::InvalidCredentials)
}

/// Handler for client log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie and the logged in cookie
/// are set and the client is redirected to their dashboard.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    plain_jar: CookieJar,
    Form(log_in_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(log_in_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    let authentication_result = match state.db_connection.lock() {
        Ok(connection) => {
            authenticate_client(&log_in_data.email, &log_in_data.password, &connection)
        }
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    let client = match authentication_result {
        Ok(client) => client,
        Err(Error::InvalidCredentials) => {
            return log_in_form(
                &log_in_data.email,
                Some(INVALID_CREDENTIALS_ERROR_MSG),
                redirect_url,
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(&log_in_data.email, Some(INTERNAL_ERROR_MSG), redirect_url)
                .into_response();
        }
    };

    let cookie_duration = if log_in_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let subject = Subject::Client(ClientSession {
        client_id: client.id,
        client_name: client.details.name,
    });
    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_auth_cookie(jar.clone(), subject, cookie_duration) {
        Ok(updated_jar) => {
            tracing::info!("Client {} logged in", client.id);
            (
                StatusCode::SEE_OTHER,
                HxRedirect(redirect_url.to_owned()),
                updated_jar,
                set_logged_in_cookie(plain_jar),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The raw data entered by the client in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the hash in the database.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,

    /// Password entered during log-in.
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
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
