//! Client deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    client::{ClientId, delete_client},
};

/// The state needed for deleting a client.
#[derive(Debug, Clone)]
pub struct DeleteClientEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteClientEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle client deletion, which also deletes their accounts and transactions.
pub async fn delete_client_endpoint(
    Path(client_id): Path<i64>,
    State(state): State<DeleteClientEndpointState>,
) -> Response {
    let client_id = ClientId::new(client_id);
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_client(client_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(rows_affected) if rows_affected != 0 => {
            tracing::info!("Deleted client {client_id}");
            Alert::SuccessSimple {
                message: "Client deleted successfully".to_owned(),
            }
            .into_response()
        }
        Ok(_) => Error::DeleteMissingClient.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete client {client_id}: {error}");
            error.into_alert_response()
        }
    }
}
