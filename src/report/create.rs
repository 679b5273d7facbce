//! The page and endpoint for creating a monthly account report.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{Account, AccountId, get_all_accounts},
    client::{ClientId, get_all_clients},
    config::SiteConfig,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
    period::MonthOfYear,
    report::{core::create_report, reports_page::ReportsPageState},
};

struct AccountOption {
    id: AccountId,
    label: String,
}

fn get_account_options(connection: &Connection) -> Result<Vec<AccountOption>, Error> {
    let client_names: HashMap<ClientId, String> = get_all_clients(connection)?
        .into_iter()
        .map(|client| (client.id, client.details.name))
        .collect();

    Ok(get_all_accounts(connection)?
        .into_iter()
        .map(|account: Account| {
            let owner = client_names
                .get(&account.client_id)
                .map(String::as_str)
                .unwrap_or_default();

            AccountOption {
                id: account.id,
                label: format!("{} ({owner})", account.number),
            }
        })
        .collect())
}

fn create_report_form(accounts: &[AccountOption]) -> Markup {
    let default_period = MonthOfYear::DEFAULT;

    html! {
        form
            hx-post=(endpoints::REPORTS_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }

                select
                    id="account_id"
                    name="account_id"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for account in accounts {
                        option value=(account.id) { (account.label) }
                    }
                }
            }

            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                input
                    id="month"
                    type="number"
                    name="month"
                    min="1"
                    max="12"
                    value=(default_period.month())
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                input
                    id="year"
                    type="number"
                    name="year"
                    value=(default_period.year())
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                "Create Report"
            }
        }
    }
}

fn create_report_view(accounts: &[AccountOption], site: &SiteConfig) -> Markup {
    let nav_bar = NavBar::admin(endpoints::NEW_REPORT_VIEW, site).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Report" }

            @if accounts.is_empty() {
                p
                {
                    "There are no accounts to report on. "
                    a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE) { "Open an account" }
                    " first."
                }
            } @else {
                (create_report_form(accounts))
            }
        }
    };

    base(&site.page_title("New Report"), &content)
}

/// Renders the page for creating a report.
pub async fn get_new_report_page(State(state): State<ReportsPageState>) -> Result<Response, Error> {
    let accounts = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_account_options(&connection)
            .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?
    };

    Ok(create_report_view(&accounts, &state.site).into_response())
}

/// The state needed to create a report.
#[derive(Debug, Clone)]
pub struct CreateReportState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a report.
#[derive(Debug, Deserialize)]
pub struct ReportForm {
    pub account_id: AccountId,
    pub year: i32,
    /// The month number from 1 to 12.
    pub month: u8,
}

/// A route handler for creating a report, redirects to the reports view on success.
pub async fn create_report_endpoint(
    State(state): State<CreateReportState>,
    Form(form): Form<ReportForm>,
) -> Response {
    let period = match MonthOfYear::new(form.year, form.month) {
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

    match create_report(form.account_id, period, &connection) {
        Ok(report) => {
            tracing::info!(
                "Created report {} for account {} in {period}",
                report.id,
                report.account_id
            );
            (
                HxRedirect(endpoints::REPORTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::warn!("Could not create report: {error}");
            error.into_alert_response()
        }
    }
}
