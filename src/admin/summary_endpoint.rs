//! The batch action that summarises the monthly activity of the selected clients.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    admin::{
        activity::{count_transactions_for_clients, format_activity_summary},
        clients_page::ACTIVITY_SUMMARY_ID,
    },
    alert::Alert,
    client::ClientId,
    period::MonthOfYear,
};

/// The state needed for summarising client activity.
#[derive(Debug, Clone)]
pub struct ClientSummaryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ClientSummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The selected clients and the month to summarise.
#[derive(Debug, Deserialize)]
pub struct SummaryForm {
    /// One entry per ticked checkbox.
    #[serde(default)]
    pub client_id: Vec<i64>,
    pub year: Option<i32>,
    pub month: Option<u8>,
}

fn summary_view(period: MonthOfYear, summary: &str) -> Markup {
    html! {
        div id=(ACTIVITY_SUMMARY_ID) class="w-full p-4 rounded-lg border border-gray-200 dark:border-gray-700 bg-white dark:bg-gray-800"
        {
            h2 class="font-bold mb-2" { "Activity in " (period) }
            pre class="whitespace-pre-wrap font-mono text-sm" { (summary) }
        }
    }
}

/// Summarise the number of transactions each selected client made in the month.
///
/// Responds with one "{name} - Transacciones: {count}" line per client,
/// highest count first.
pub async fn summarise_clients_endpoint(
    State(state): State<ClientSummaryState>,
    Form(form): Form<SummaryForm>,
) -> Response {
    if form.client_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Alert::ErrorSimple {
                message: "Select at least one client".to_owned(),
            }
            .into_html(),
        )
            .into_response();
    }

    let period = match MonthOfYear::from_parts(form.year, form.month) {
        Ok(period) => period,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let client_ids = form
        .client_id
        .iter()
        .copied()
        .map(ClientId::new)
        .collect::<Vec<_>>();

    match count_transactions_for_clients(&client_ids, period, &connection) {
        Ok(activity) => summary_view(period, &format_activity_summary(&activity)).into_response(),
        Err(error) => {
            tracing::error!("Could not summarise client activity for {period}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::datetime;

    use crate::{
        admin::{
            summary_endpoint::{ClientSummaryState, summarise_clients_endpoint},
            test_support::{must_deposit_at, must_open_account},
        },
        client::test_support::must_create_client,
        db::initialize,
        endpoints,
    };

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let ana = must_create_client("Ana", "ana@example.com", &connection);
        let ben = must_create_client("Ben", "ben@example.com", &connection);
        must_create_client("Cat", "cat@example.com", &connection);
        let ana_account = must_open_account(ana.id, &connection);
        let ben_account = must_open_account(ben.id, &connection);
        must_deposit_at(&ana_account, datetime!(2024-03-02 12:00:00 UTC), &connection);
        for day in 3..=4 {
            must_deposit_at(
                &ben_account,
                datetime!(2024-03-01 12:00:00 UTC) + time::Duration::days(day),
                &connection,
            );
        }

        let state = ClientSummaryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route(endpoints::CLIENT_SUMMARY_API, post(summarise_clients_endpoint))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn summarises_selected_clients_highest_first() {
        let server = get_test_server();

        let response = server
            .post(endpoints::CLIENT_SUMMARY_API)
            .form(&[
                ("client_id", "1"),
                ("client_id", "2"),
                ("year", "2024"),
                ("month", "3"),
            ])
            .await;

        response.assert_status_ok();
        let html = Html::parse_fragment(&response.text());
        let summary = html
            .select(&Selector::parse("#activity-summary pre").unwrap())
            .next()
            .expect("No summary found")
            .text()
            .collect::<String>();
        assert_eq!(summary, "Ben - Transacciones: 2\nAna - Transacciones: 1");
    }

    #[tokio::test]
    async fn single_selection_is_accepted() {
        let server = get_test_server();

        let response = server
            .post(endpoints::CLIENT_SUMMARY_API)
            .form(&[("client_id", "3")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Cat - Transacciones: 0"));
    }

    #[tokio::test]
    async fn empty_selection_is_bad_request() {
        let server = get_test_server();

        let response = server
            .post(endpoints::CLIENT_SUMMARY_API)
            .form(&[("year", "2024"), ("month", "3")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Select at least one client"));
    }
}
