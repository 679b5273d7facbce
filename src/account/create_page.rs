//! The page for opening a new account.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    account::{AccountType, accounts_page::AccountState},
    client::{Client, get_all_clients},
    config::SiteConfig,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base,
        loading_spinner,
    },
    navigation::NavBar,
};

fn account_type_radio(account_type: AccountType, checked: bool) -> Markup {
    let id = format!("account-type-{}", account_type.as_str());

    html! {
        label for=(id) class=(FORM_RADIO_LABEL_STYLE)
        {
            input
                id=(id)
                type="radio"
                name="account_type"
                value=(account_type.as_str())
                checked[checked]
                required
                class=(FORM_RADIO_INPUT_STYLE);

            (account_type)
        }
    }
}

fn decimal_input(name: &str, label: &str, placeholder: &str) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                id=(name)
                type="number"
                name=(name)
                step="0.01"
                placeholder=(placeholder)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

fn create_account_form(clients: &[Client]) -> Markup {
    html! {
        form
            hx-post=(endpoints::ACCOUNTS_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="client_id" class=(FORM_LABEL_STYLE) { "Client" }

                select
                    id="client_id"
                    name="client_id"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Select a client" }

                    @for client in clients {
                        option value=(client.id) { (client.details.name) }
                    }
                }
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Account type" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    (account_type_radio(AccountType::Saving, true))
                    (account_type_radio(AccountType::Current, false))
                }
            }

            (decimal_input("balance", "Opening balance", "0.00"))
            (decimal_input("interest_rate", "Interest rate (%), saving accounts only", "0.00"))
            (decimal_input("limit", "Overdraft limit, current accounts only", "0.00"))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                "Open Account"
            }
        }
    }
}

fn create_account_view(clients: &[Client], site: &SiteConfig) -> Markup {
    let nav_bar = NavBar::admin(endpoints::NEW_ACCOUNT_VIEW, site).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Open Account" }

            @if clients.is_empty() {
                p
                {
                    "There are no clients to open an account for. "
                    a href=(endpoints::NEW_CLIENT_VIEW) class=(LINK_STYLE) { "Create a client" }
                    " first."
                }
            } @else {
                (create_account_form(clients))
            }
        }
    };

    base(&site.page_title("Open Account"), &content)
}

/// Renders the page for opening an account.
pub async fn get_create_account_page(State(state): State<AccountState>) -> Result<Response, Error> {
    let clients = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_clients(&connection)
            .inspect_err(|error| tracing::error!("could not get clients: {error}"))?
    };

    Ok(create_account_view(&clients, &state.site).into_response())
}
