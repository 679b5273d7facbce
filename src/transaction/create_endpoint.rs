//! Defines the endpoint for creating a transaction and applying it to an account balance.

use std::sync::{Arc, Mutex};

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
    account::AccountId,
    endpoints,
    transaction::{NewTransaction, TransactionType, create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The account the transaction is made against.
    pub account_id: AccountId,
    /// The amount of money.
    pub value: Decimal,
    /// The type code, `D` for a deposit or `W` for a withdrawal.
    pub transaction_type: String,
}

/// A route handler for creating a transaction, redirects to the transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let transaction_type = match form.transaction_type.parse::<TransactionType>() {
        Ok(transaction_type) => transaction_type,
        Err(error) => {
            tracing::warn!("Rejected transaction for account {}: {error}", form.account_id);
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let new_transaction = NewTransaction {
        account_id: form.account_id,
        value: form.value,
        transaction_type,
        created_at: None,
    };

    match create_transaction(new_transaction, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not create transaction with {form:?}: {error}");
            error.into_alert_response()
        }
    }
}
