//! Client creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{PasswordHash, ValidatedPassword},
    client::{
        ClientDetails, NewClient, create_client,
        form::{ClientForm, client_form_fields},
    },
    config::SiteConfig,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for creating a client.
#[derive(Debug, Clone)]
pub struct CreateClientEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateClientEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the client creation page.
pub async fn get_new_client_page(State(site): State<SiteConfig>) -> Response {
    new_client_view(&site).into_response()
}

/// Handle client creation form submission.
pub async fn create_client_endpoint(
    State(state): State<CreateClientEndpointState>,
    Form(form): Form<ClientForm>,
) -> Response {
    let (details, password) = form.into_parts();

    if let Err(error) = details.validate() {
        return error.into_alert_response();
    }

    let password_hash = match ValidatedPassword::new_non_empty(&password)
        .and_then(|password| PasswordHash::new(password, PasswordHash::DEFAULT_COST))
    {
        Ok(password_hash) => password_hash,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_client(
        NewClient {
            details,
            password_hash,
        },
        &connection,
    ) {
        Ok(client) => {
            tracing::info!("Created client {}", client.id);
            (
                HxRedirect(endpoints::CLIENTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::warn!("Could not create client: {error}");
            error.into_alert_response()
        }
    }
}

fn new_client_view(site: &SiteConfig) -> Markup {
    let nav_bar = NavBar::admin(endpoints::NEW_CLIENT_VIEW, site).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::CLIENTS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Client" }

                (client_form_fields(&ClientDetails::default(), true))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Client" }
            }
        }
    };

    base(&site.page_title("New Client"), &content)
}
