//! Client editing page and endpoint.
//!
//! The edit page also lists the client's accounts and the transactions made
//! against them.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, get_accounts_for_client},
    auth::{PasswordHash, ValidatedPassword},
    client::{
        Client, ClientId,
        form::{ClientForm, client_form_fields},
        get_client, update_client,
    },
    config::SiteConfig,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, TABLE_STYLE, base, format_balance, format_currency, format_timestamp,
    },
    navigation::NavBar,
    transaction::{Transaction, get_transactions_for_client},
};

/// The state needed for the edit client page.
#[derive(Debug, Clone)]
pub struct EditClientPageState {
    pub site: SiteConfig,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditClientPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            site: state.site.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating a client.
#[derive(Debug, Clone)]
pub struct UpdateClientEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateClientEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the client editing page.
pub async fn get_edit_client_page(
    Path(client_id): Path<i64>,
    State(state): State<EditClientPageState>,
) -> Result<Response, Error> {
    let client_id = ClientId::new(client_id);
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let client = get_client(client_id, &connection)?;
    let accounts = get_accounts_for_client(client_id, &connection)
        .inspect_err(|error| tracing::error!("could not get accounts for client {client_id}: {error}"))?;
    let transactions = get_transactions_for_client(client_id, &connection).inspect_err(|error| {
        tracing::error!("could not get transactions for client {client_id}: {error}")
    })?;

    Ok(edit_client_view(&client, &accounts, &transactions, &state.site).into_response())
}

/// Handle client update form submission.
///
/// An empty password keeps the client's current password.
pub async fn update_client_endpoint(
    Path(client_id): Path<i64>,
    State(state): State<UpdateClientEndpointState>,
    Form(form): Form<ClientForm>,
) -> Response {
    let client_id = ClientId::new(client_id);
    let (details, password) = form.into_parts();

    let password_hash = if password.is_empty() {
        None
    } else {
        match PasswordHash::new(
            ValidatedPassword::new_unchecked(&password),
            PasswordHash::DEFAULT_COST,
        ) {
            Ok(password_hash) => Some(password_hash),
            Err(error) => return error.into_alert_response(),
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_client(client_id, &details, password_hash.as_ref(), &connection) {
        Ok(()) => (
            HxRedirect(endpoints::CLIENTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::warn!("Could not update client {client_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn accounts_table(accounts: &[Account]) -> Markup {
    html! {
        table class=(TABLE_STYLE)
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Number" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                    th scope="col" class="px-6 py-3 text-right" { "Balance" }
                }
            }

            tbody
            {
                @for account in accounts {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (account.number) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            @if let Some(kind) = account.kind {
                                (kind.account_type())
                            }
                        }
                        td class="px-6 py-4 text-right tabular-nums" { (format_balance(account.balance)) }
                    }
                }
            }
        }
    }
}

fn transactions_table(transactions: &[Transaction], accounts: &[Account]) -> Markup {
    let account_number = |transaction: &Transaction| {
        accounts
            .iter()
            .find(|account| account.id == transaction.account_id)
            .map(|account| account.number.as_str())
            .unwrap_or_default()
    };

    html! {
        table class=(TABLE_STYLE) id="client-transactions"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                    th scope="col" class="px-6 py-3 text-right" { "Value" }
                }
            }

            tbody
            {
                @for transaction in transactions {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (format_timestamp(transaction.created_at)) }
                        td class=(TABLE_CELL_STYLE) { (account_number(transaction)) }
                        td class=(TABLE_CELL_STYLE) { (transaction.transaction_type) }
                        td class="px-6 py-4 text-right tabular-nums" { (format_currency(transaction.value)) }
                    }
                }

                @if transactions.is_empty() {
                    tr
                    {
                        td colspan="4" class="px-6 py-4 text-center" { "No transactions yet." }
                    }
                }
            }
        }
    }
}

fn edit_client_view(
    client: &Client,
    accounts: &[Account],
    transactions: &[Transaction],
    site: &SiteConfig,
) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_CLIENT_VIEW, client.id.as_i64());
    let update_url = format_endpoint(endpoints::CLIENT_API, client.id.as_i64());
    let nav_bar = NavBar::admin(&edit_url, site).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Client" }

                (client_form_fields(&client.details, false))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Client" }
            }
        }

        section class="flex flex-col items-center px-6 py-8 mx-auto w-full lg:max-w-5xl space-y-4"
        {
            h2 class="text-xl font-bold self-start" { "Accounts" }
            div class="w-full overflow-x-auto" { (accounts_table(accounts)) }

            h2 class="text-xl font-bold self-start" { "Transactions" }
            div class="w-full overflow-x-auto" { (transactions_table(transactions, accounts)) }
        }
    };

    base(&site.page_title("Edit Client"), &content)
}

#[cfg(test)]
mod edit_client_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::datetime;

    use crate::{
        Error,
        admin::test_support::{must_deposit_at, must_open_account},
        client::{edit::EditClientPageState, get_edit_client_page, test_support::must_create_client},
        config::SiteConfig,
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    fn get_state(connection: Connection) -> EditClientPageState {
        EditClientPageState {
            site: SiteConfig::default(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn render_page_with_client_details_and_transactions() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let ana = must_create_client("Ana", "ana@example.com", &connection);
        let account = must_open_account(ana.id, &connection);
        must_deposit_at(&account, datetime!(2024-03-02 10:00:00 UTC), &connection);
        must_deposit_at(&account, datetime!(2024-03-05 10:00:00 UTC), &connection);

        let response = get_edit_client_page(Path(ana.id.as_i64()), State(get_state(connection)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::CLIENT_API, ana.id.as_i64()),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Ana");
        assert_form_input_with_value(&form, "email", "email", "ana@example.com");
        let password = form
            .select(&Selector::parse("input[name=password]").unwrap())
            .next()
            .expect("No password input found");
        assert_eq!(password.value().attr("required"), None);

        let transaction_rows = html
            .select(&Selector::parse("#client-transactions tbody tr").unwrap())
            .count();
        assert_eq!(transaction_rows, 2);
    }

    #[tokio::test]
    async fn missing_client_is_not_found() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let result = get_edit_client_page(Path(42), State(get_state(connection))).await;

        let error = result.expect_err("want error for missing client");
        assert_eq!(error, Error::NotFound);
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }
}

#[cfg(test)]
mod update_client_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        client::{
            ClientId, edit::UpdateClientEndpointState, form::ClientForm, get_client,
            test_support::must_create_client, update_client_endpoint,
        },
        db::initialize,
        endpoints,
        test_utils::assert_hx_redirect,
    };

    fn get_state() -> (UpdateClientEndpointState, ClientId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let ana = must_create_client("Ana", "ana@example.com", &connection);

        (
            UpdateClientEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            ana.id,
        )
    }

    fn update_form(name: &str, password: &str) -> ClientForm {
        ClientForm {
            name: name.to_owned(),
            email: "ana.new@example.com".to_owned(),
            password: password.to_owned(),
            phone: String::new(),
            address: "2 Queen Street".to_owned(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
        }
    }

    #[tokio::test]
    async fn empty_password_keeps_old_hash() {
        let (state, client_id) = get_state();
        let old_hash = get_client(client_id, &state.db_connection.lock().unwrap())
            .unwrap()
            .password_hash;

        let response = update_client_endpoint(
            Path(client_id.as_i64()),
            State(state.clone()),
            Form(update_form("Ana Smith", "")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CLIENTS_VIEW);
        let client = get_client(client_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(client.details.name, "Ana Smith");
        assert_eq!(client.details.email, "ana.new@example.com");
        assert_eq!(client.password_hash, old_hash);
    }

    #[tokio::test]
    async fn new_password_is_hashed() {
        let (state, client_id) = get_state();

        update_client_endpoint(
            Path(client_id.as_i64()),
            State(state.clone()),
            Form(update_form("Ana", "new password")),
        )
        .await;

        let client = get_client(client_id, &state.db_connection.lock().unwrap()).unwrap();
        assert!(client.password_hash.verify("new password").unwrap());
    }

    #[tokio::test]
    async fn missing_client_is_not_found() {
        let (state, _) = get_state();

        let response =
            update_client_endpoint(Path(42), State(state), Form(update_form("Ben", ""))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
