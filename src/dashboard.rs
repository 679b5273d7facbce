//! The page a client sees after logging in, listing their accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, AccountKind, get_accounts_for_client},
    auth::ClientSession,
    endpoints,
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE,
        base, format_balance,
    },
    navigation::NavBar,
};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn account_terms(kind: Option<AccountKind>) -> String {
    match kind {
        Some(AccountKind::Saving { interest_rate }) => format!("Saving, {interest_rate}% interest"),
        Some(AccountKind::Current { limit }) => format!("Current, {limit} limit"),
        None => String::new(),
    }
}

fn dashboard_view(session: &ClientSession, accounts: &[Account]) -> Markup {
    let nav_bar = NavBar::client(endpoints::DASHBOARD_VIEW, &session.client_name).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-4xl"
            {
                h1 class="text-xl font-bold" { "My Accounts" }

                @if accounts.is_empty() {
                    p class="text-gray-500 dark:text-gray-400" { "You do not have any accounts yet." }
                } @else {
                    table class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Terms" }
                                th scope="col" class="px-6 py-3 text-right" { "Balance" }
                            }
                        }

                        tbody
                        {
                            @for account in accounts {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (account.number) }
                                    td class=(TABLE_CELL_STYLE) { (account_terms(account.kind)) }
                                    td class="px-6 py-4 text-right tabular-nums" { (format_balance(account.balance)) }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("My Accounts", &content)
}

/// Display the accounts of the logged in client.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(session): Extension<ClientSession>,
) -> Result<Response, Error> {
    let accounts = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_accounts_for_client(session.client_id, &connection).inspect_err(|error| {
            tracing::error!("could not get accounts for {}: {error}", session.client_id)
        })?
    };

    Ok(dashboard_view(&session, &accounts).into_response())
}
