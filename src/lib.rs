//! Ledger Admin is a small web app for managing clients, their saving and
//! current accounts, and the transactions made against those accounts.
//!
//! This library provides a REST API that directly serves HTML pages: an admin
//! site for managing the ledger and a log-in area where clients can view
//! their accounts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod account;
mod admin;
mod alert;
mod app_state;
mod auth;
mod client;
mod config;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod period;
mod report;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use account::{
    Account, AccountId, AccountKind, AccountType, NewAccount, get_account, provision_account,
};
pub use app_state::AppState;
pub use auth::{PasswordHash, ValidatedPassword, get_admin_password_hash, set_admin_password};
pub use client::{Client, ClientDetails, ClientId, NewClient, create_client, get_client};
pub use config::SiteConfig;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use period::MonthOfYear;
pub use report::create_report;
pub use routing::build_router;
pub use transaction::{NewTransaction, Transaction, TransactionType, create_transaction};

use crate::{
    alert::Alert, html::error_view, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a client, or the
    /// admin password was incorrect.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The auth token cookie is missing, could not be decrypted or has expired.
    #[error("no valid auth token in the cookie jar")]
    CookieMissing,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An empty string was given as a password.
    #[error("Password cannot be empty")]
    EmptyPassword,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The admin password has not been set with the `set_admin_password` tool.
    #[error("the admin password has not been set")]
    AdminPasswordNotSet,

    /// An empty string was used for a client name.
    #[error("Client name cannot be empty")]
    EmptyClientName,

    /// The email address entered for a client is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The specified client name already exists in the database.
    #[error("the client \"{0}\" already exists in the database")]
    DuplicateClientName(String),

    /// An account was requested without specifying the client that owns it.
    #[error("client_id is required")]
    MissingClientId,

    /// The client ID does not refer to a client in the database.
    #[error("Client with id {0} does not exist")]
    ClientNotFound(ClientId),

    /// The account ID does not refer to an account in the database.
    #[error("Account with id {0} does not exist")]
    AccountNotFound(AccountId),

    /// The account type was not one of `saving` or `current`.
    #[error("\"{0}\" is not a valid account type, expected \"saving\" or \"current\"")]
    InvalidAccountType(String),

    /// The transaction type was not one of `D` (deposit) or `W` (withdraw).
    #[error("\"{0}\" is not a valid transaction type, expected \"D\" or \"W\"")]
    InvalidTransactionType(String),

    /// A month outside of the range 1 to 12 (inclusive) was given.
    #[error("{0} is not a valid month, expected a number from 1 to 12")]
    InvalidMonth(u8),

    /// Could not find an unused account number after several attempts.
    #[error("could not generate a unique account number after {0} attempts")]
    AccountNumberExhausted(usize),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a client that does not exist
    #[error("tried to update a client that is not in the database")]
    UpdateMissingClient,

    /// Tried to delete a client that does not exist
    #[error("tried to delete a client that is not in the database")]
    DeleteMissingClient,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// Tried to delete a report that does not exist
    #[error("tried to delete a report that is not in the database")]
    DeleteMissingReport,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidMonth(month) => (
                StatusCode::BAD_REQUEST,
                error_view(
                    "Bad Request",
                    "400",
                    &format!("{month} is not a valid month."),
                    "Choose a month from 1 to 12.",
                ),
            )
                .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::MissingClientId
            | Error::ClientNotFound(_)
            | Error::AccountNotFound(_)
            | Error::InvalidAccountType(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidMonth(_)
            | Error::EmptyClientName
            | Error::EmptyPassword
            | Error::InvalidEmail(_) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid input".to_owned(),
                    details: capitalise_first_char(&self.to_string()),
                },
            ),
            Error::DuplicateClientName(name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate Client Name".to_owned(),
                    details: format!(
                        "The client {name} already exists in the database. \
                        Choose a different name, or edit the existing client."
                    ),
                },
            ),
            Error::UpdateMissingClient => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update client".to_owned(),
                    details: "The client could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingClient => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete client".to_owned(),
                    details: "The client could not be found. \
                    Try refreshing the page to see if the client has already been deleted."
                        .to_owned(),
                },
            ),
            Error::DeleteMissingAccount => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete account".to_owned(),
                    details: "The account could not be found. \
                    Try refreshing the page to see if the account has already been deleted."
                        .to_owned(),
                },
            ),
            Error::DeleteMissingReport => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete report".to_owned(),
                    details: "The report could not be found. \
                    Try refreshing the page to see if the report has already been deleted."
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

        (status_code, alert.into_html()).into_response()
    }
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
