//! Displays all accounts with their owner, kind and balance.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    AppState, Error,
    account::{AccountId, AccountKind, get_all_accounts},
    client::{ClientId, get_all_clients},
    config::SiteConfig,
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, base, delete_action_button, format_balance,
    },
    navigation::NavBar,
};

/// The state needed for the [get_accounts_page](crate::account::get_accounts_page) route handler.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub site: SiteConfig,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            site: state.site.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The account data to display in the view
#[derive(Debug, PartialEq)]
struct AccountTableRow {
    id: AccountId,
    number: String,
    client_name: String,
    kind: Option<AccountKind>,
    balance: Option<Decimal>,
}

impl AccountTableRow {
    fn kind_label(&self) -> String {
        match self.kind {
            Some(kind) => kind.account_type().to_string(),
            None => "—".to_owned(),
        }
    }

    fn kind_parameter(&self) -> String {
        match self.kind {
            Some(AccountKind::Saving { interest_rate }) => format!("{interest_rate}% interest"),
            Some(AccountKind::Current { limit }) => format!("{limit} limit"),
            None => String::new(),
        }
    }
}

fn accounts_view(accounts: &[AccountTableRow], site: &SiteConfig) -> Markup {
    let create_account_page_url = endpoints::NEW_ACCOUNT_VIEW;
    let nav_bar = NavBar::admin(endpoints::ACCOUNTS_VIEW, site).into_html();

    let table_row = |account: &AccountTableRow| {
        let delete_button = delete_action_button(
            &format_endpoint(endpoints::DELETE_ACCOUNT, account.id),
            &format!(
                "Are you sure you want to delete the account {}? Its transactions will also be deleted.",
                account.number
            ),
            "closest tr",
            "delete",
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white tabular-nums"
                {
                    (account.number)
                }

                td class=(TABLE_CELL_STYLE) { (account.client_name) }

                td class=(TABLE_CELL_STYLE) { (account.kind_label()) }

                td class=(TABLE_CELL_STYLE) { (account.kind_parameter()) }

                td class="px-6 py-4 text-right tabular-nums"
                {
                    (format_balance(account.balance))
                }

                td class=(TABLE_CELL_STYLE) { (delete_button) }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Accounts" }

                    a href=(create_account_page_url) class=(LINK_STYLE)
                    {
                        "Open Account"
                    }
                }

                section class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Number" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Client" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Rate / Limit" }
                                th scope="col" class="px-6 py-3 text-right" { "Balance" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for account in accounts {
                                (table_row(account))
                            }

                            @if accounts.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No accounts found. Open an account "
                                        a href=(create_account_page_url) class=(LINK_STYLE)
                                        {
                                            "here"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base(&site.page_title("Accounts"), &content)
}

/// Renders the accounts page showing all accounts.
pub async fn get_accounts_page(State(state): State<AccountState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_account_table_rows(&connection)
        .inspect_err(|error| tracing::error!("could not get all accounts: {error}"))?;

    Ok(accounts_view(&accounts, &state.site).into_response())
}

fn get_account_table_rows(connection: &Connection) -> Result<Vec<AccountTableRow>, Error> {
    let client_names: HashMap<ClientId, String> = get_all_clients(connection)?
        .into_iter()
        .map(|client| (client.id, client.details.name))
        .collect();

    let rows = get_all_accounts(connection)?
        .into_iter()
        .map(|account| AccountTableRow {
            id: account.id,
            client_name: client_names
                .get(&account.client_id)
                .cloned()
                .unwrap_or_default(),
            number: account.number,
            kind: account.kind,
            balance: account.balance,
        })
        .collect();

    Ok(rows)
}
