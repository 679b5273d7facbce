//! The admin listing of clients with the number of transactions each made in a month.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    admin::activity::{ClientActivity, count_transactions_per_client},
    config::SiteConfig,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE,
        base, edit_delete_action_links,
    },
    navigation::NavBar,
    period::MonthOfYear,
};

/// The state needed for the clients page.
#[derive(Debug, Clone)]
pub struct ClientsPageState {
    pub site: SiteConfig,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ClientsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            site: state.site.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The month to count transactions for, defaults to March 2024.
#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    pub year: Option<i32>,
    pub month: Option<u8>,
}

/// The ID of the element that the activity summary replaces.
pub const ACTIVITY_SUMMARY_ID: &str = "activity-summary";

fn period_filter(period: MonthOfYear) -> Markup {
    html! {
        form
            id="period-filter"
            method="get"
            action=(endpoints::CLIENTS_VIEW)
            class="flex flex-wrap items-end gap-2"
        {
            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }
                input
                    id="year"
                    type="number"
                    name="year"
                    value=(period.year())
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
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
                    value=(period.month())
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class="px-4 py-2 bg-blue-500 text-white rounded" { "Filter" }
        }
    }
}

fn client_row(activity: &ClientActivity) -> Markup {
    let client_id = activity.client_id.as_i64();
    let action_links = edit_delete_action_links(
        &format_endpoint(endpoints::EDIT_CLIENT_VIEW, client_id),
        &format_endpoint(endpoints::CLIENT_API, client_id),
        &format!(
            "Are you sure you want to delete {}? Their accounts and transactions will also be deleted.",
            activity.name
        ),
        "closest tr",
        "delete",
    );

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                input
                    type="checkbox"
                    name="client_id"
                    value=(client_id)
                    aria-label={ "Select " (activity.name) };
            }
            th scope="row" class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (activity.name)
            }
            td class=(TABLE_CELL_STYLE) { (activity.email) }
            td class=(TABLE_CELL_STYLE) { (activity.phone) }
            td class=(TABLE_CELL_STYLE) { (activity.address) }
            td class="px-6 py-4 text-right tabular-nums" { (activity.transaction_count) }
            td class="px-6 py-4 space-x-2" { (action_links) }
        }
    }
}

fn clients_view(activity: &[ClientActivity], period: MonthOfYear, site: &SiteConfig) -> Markup {
    let nav_bar = NavBar::admin(endpoints::CLIENTS_VIEW, site).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Clients" }

                    a href=(endpoints::NEW_CLIENT_VIEW) class=(LINK_STYLE) { "Create Client" }
                }

                (period_filter(period))

                form
                    id="client-summary"
                    hx-post=(endpoints::CLIENT_SUMMARY_API)
                    hx-target={ "#" (ACTIVITY_SUMMARY_ID) }
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class="space-y-4"
                {
                    input type="hidden" name="year" value=(period.year());
                    input type="hidden" name="month" value=(period.month());

                    div class="w-full overflow-x-auto dark:bg-gray-800"
                    {
                        table class=(TABLE_STYLE)
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Select" } }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Email" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Phone" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Address" }
                                    th scope="col" class="px-6 py-3 text-right" { "Transactions in " (period) }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }

                            tbody
                            {
                                @for client in activity {
                                    (client_row(client))
                                }

                                @if activity.is_empty() {
                                    tr
                                    {
                                        td colspan="7" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                        {
                                            "No clients yet."
                                        }
                                    }
                                }
                            }
                        }
                    }

                    div class="max-w-xs"
                    {
                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Summarise selected" }
                    }
                }

                div id=(ACTIVITY_SUMMARY_ID) {}
            }
        }
    };

    base(&site.page_title("Clients"), &content)
}

/// Display the clients with their transaction count for the month in the query.
///
/// # Errors
/// Returns [Error::InvalidMonth] if the month in the query is not from 1 to 12.
pub async fn get_clients_page(
    State(state): State<ClientsPageState>,
    Query(query): Query<ClientsQuery>,
) -> Result<Response, Error> {
    let period = MonthOfYear::from_parts(query.year, query.month)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let activity = count_transactions_per_client(period, &connection)
        .inspect_err(|error| tracing::error!("could not count transactions for {period}: {error}"))?;

    Ok(clients_view(&activity, period, &state.site).into_response())
}
