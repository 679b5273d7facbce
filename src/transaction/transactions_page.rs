//! Defines the route handler for the page that lists the most recent transactions.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    config::SiteConfig,
    db::{SqlDecimal, Timestamp},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, base, format_currency, format_timestamp,
    },
    navigation::NavBar,
    transaction::{TransactionId, TransactionType},
};

/// How many transactions to show on the transactions page.
pub const RECENT_TRANSACTION_LIMIT: u32 = 50;

/// The state needed for the transactions and new transaction pages.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    pub site: SiteConfig,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            site: state.site.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, PartialEq)]
struct TransactionTableRow {
    id: TransactionId,
    account_number: String,
    client_name: String,
    transaction_type: TransactionType,
    value: Decimal,
    created_at: OffsetDateTime,
}

fn get_recent_transactions(
    limit: u32,
    connection: &Connection,
) -> Result<Vec<TransactionTableRow>, Error> {
    connection
        .prepare(
            "SELECT \"transaction\".id, account.number, client.name, \"transaction\".type,
                \"transaction\".value, \"transaction\".created_at
            FROM \"transaction\"
            INNER JOIN account ON account.id = \"transaction\".account_id
            INNER JOIN client ON client.id = account.client_id
            ORDER BY \"transaction\".created_at DESC, \"transaction\".id DESC
            LIMIT :limit",
        )?
        .query_map(&[(":limit", &limit)], |row| {
            let code: String = row.get(3)?;
            let transaction_type = code.parse::<TransactionType>().map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(error),
                )
            })?;
            let SqlDecimal(value) = row.get(4)?;
            let Timestamp(created_at) = row.get(5)?;

            Ok(TransactionTableRow {
                id: row.get(0)?,
                account_number: row.get(1)?,
                client_name: row.get(2)?,
                transaction_type,
                value,
                created_at,
            })
        })?
        .map(|row_result| row_result.map_err(Error::from))
        .collect()
}

fn transactions_view(transactions: &[TransactionTableRow], site: &SiteConfig) -> Markup {
    let new_transaction_page_url = endpoints::NEW_TRANSACTION_VIEW;
    let nav_bar = NavBar::admin(endpoints::TRANSACTIONS_VIEW, site).into_html();

    let table_row = |transaction: &TransactionTableRow| {
        let value_style = match transaction.transaction_type {
            TransactionType::Deposit => "px-6 py-4 text-right tabular-nums text-green-600",
            TransactionType::Withdraw => "px-6 py-4 text-right tabular-nums text-red-600",
        };

        html!(
            tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
            {
                td class=(TABLE_CELL_STYLE) { (format_timestamp(transaction.created_at)) }
                td class=(TABLE_CELL_STYLE) { (transaction.account_number) }
                td class=(TABLE_CELL_STYLE) { (transaction.client_name) }
                td class=(TABLE_CELL_STYLE) { (transaction.transaction_type) }
                td class=(value_style) { (format_currency(transaction.value)) }
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
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(new_transaction_page_url) class=(LINK_STYLE)
                    {
                        "New Transaction"
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Client" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class="px-6 py-3 text-right" { "Value" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (table_row(transaction))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions yet."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base(&site.page_title("Transactions"), &content)
}

/// Renders the page listing the most recent transactions.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_recent_transactions(RECENT_TRANSACTION_LIMIT, &connection)
        .inspect_err(|error| tracing::error!("could not get recent transactions: {error}"))?;

    Ok(transactions_view(&transactions, &state.site).into_response())
}
