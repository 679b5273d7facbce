//! Defines the endpoint for opening a new account.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{AccountType, NewAccount, provision_account},
    client::ClientId,
    endpoints,
};

/// The state needed to open an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for opening an account.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    /// The client that will own the account.
    pub client_id: Option<i64>,
    /// Either "saving" or "current".
    pub account_type: String,
    /// The opening balance.
    pub balance: Option<Decimal>,
    /// The interest rate for saving accounts.
    pub interest_rate: Option<Decimal>,
    /// The overdraft limit for current accounts.
    pub limit: Option<Decimal>,
}

impl TryFrom<AccountForm> for NewAccount {
    type Error = Error;

    fn try_from(form: AccountForm) -> Result<Self, Self::Error> {
        Ok(NewAccount {
            client_id: form.client_id.map(ClientId::new),
            account_type: AccountType::from_str(&form.account_type)?,
            balance: form.balance,
            interest_rate: form.interest_rate,
            limit: form.limit,
        })
    }
}

/// A route handler for opening an account, redirects to the accounts view on success.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Form(form): Form<AccountForm>,
) -> Response {
    let new_account = match NewAccount::try_from(form) {
        Ok(new_account) => new_account,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match provision_account(new_account, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::warn!("Could not open account: {error}");
            error.into_alert_response()
        }
    }
}
