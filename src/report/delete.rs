//! Defines the endpoint for deleting a report.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    report::core::{ReportId, delete_report},
};

/// The state needed to delete a report.
#[derive(Debug, Clone)]
pub struct DeleteReportState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a report, responds with an alert.
///
/// The account and its transactions are left untouched.
pub async fn delete_report_endpoint(
    State(state): State<DeleteReportState>,
    Path(report_id): Path<ReportId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_report(report_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(rows_affected) if rows_affected != 0 => Alert::SuccessSimple {
            message: "Report deleted successfully".to_owned(),
        }
        .into_response(),
        Ok(_) => Error::DeleteMissingReport.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete report {report_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        account::get_account,
        admin::test_support::must_open_account,
        client::test_support::must_create_client,
        period::MonthOfYear,
        report::{
            core::{create_report, get_all_reports},
            delete::{DeleteReportState, delete_report_endpoint},
        },
        test_utils::get_test_connection,
    };

    #[tokio::test]
    async fn deletes_report_but_keeps_account() {
        let connection = get_test_connection();
        let ana = must_create_client("Ana", "ana@example.com", &connection);
        let account = must_open_account(ana.id, &connection);
        let report = create_report(account.id, MonthOfYear::DEFAULT, &connection).unwrap();
        let state = DeleteReportState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_report_endpoint(State(state.clone()), Path(report.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_reports(&connection), Ok(vec![]));
        assert!(get_account(account.id, &connection).is_ok());
    }

    #[tokio::test]
    async fn missing_report_is_not_found() {
        let connection = get_test_connection();
        let state = DeleteReportState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_report_endpoint(State(state), Path(12)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
