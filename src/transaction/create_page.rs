//! Defines the route handler for the page for creating a new transaction.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    Error,
    account::{AccountId, get_all_accounts},
    client::get_all_clients,
    config::SiteConfig,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        format_balance, loading_spinner,
    },
    navigation::NavBar,
    transaction::{TransactionType, transactions_page::TransactionsViewState},
};

/// An account as shown in the account picker.
struct AccountOption {
    id: AccountId,
    label: String,
}

fn get_account_options(connection: &Connection) -> Result<Vec<AccountOption>, Error> {
    let clients = get_all_clients(connection)?;

    let options = get_all_accounts(connection)?
        .into_iter()
        .map(|account| {
            let owner = clients
                .iter()
                .find(|client| client.id == account.client_id)
                .map(|client| client.details.name.as_str())
                .unwrap_or_default();

            AccountOption {
                id: account.id,
                label: format!(
                    "{} ({owner}, {})",
                    account.number,
                    format_balance(account.balance)
                ),
            }
        })
        .collect();

    Ok(options)
}

fn transaction_type_radio(transaction_type: TransactionType, checked: bool) -> Markup {
    let id = format!("transaction-type-{}", transaction_type.code());

    html! {
        label for=(id) class=(FORM_RADIO_LABEL_STYLE)
        {
            input
                id=(id)
                type="radio"
                name="transaction_type"
                value=(transaction_type.code())
                checked[checked]
                required
                class=(FORM_RADIO_INPUT_STYLE);

            (transaction_type)
        }
    }
}

fn create_transaction_view(accounts: &[AccountOption], site: &SiteConfig) -> Markup {
    let nav_bar = NavBar::admin(endpoints::NEW_TRANSACTION_VIEW, site).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

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

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Type" }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        (transaction_type_radio(TransactionType::Deposit, true))
                        (transaction_type_radio(TransactionType::Withdraw, false))
                    }
                }

                div
                {
                    label for="value" class=(FORM_LABEL_STYLE) { "Value" }

                    input
                        name="value"
                        id="value"
                        type="number"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    "Create Transaction"
                }
            }
        }
    };

    base(&site.page_title("New Transaction"), &content)
}

/// Renders the page for creating a transaction.
pub async fn get_new_transaction_page(
    State(state): State<TransactionsViewState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_account_options(&connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;

    Ok(create_transaction_view(&accounts, &state.site).into_response())
}
