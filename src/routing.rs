//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, get_accounts_page,
        get_create_account_page,
    },
    admin::{get_admin_index_page, get_clients_page, summarise_clients_endpoint},
    auth::{
        admin_guard, admin_guard_hx, client_guard, get_admin_log_in_page, get_log_in_page,
        get_log_out, post_admin_log_in, post_log_in,
    },
    client::{
        create_client_endpoint, delete_client_endpoint, get_edit_client_page, get_new_client_page,
        update_client_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    report::{create_report_endpoint, delete_report_endpoint, get_new_report_page, get_reports_page},
    transaction::{create_transaction_endpoint, get_new_transaction_page, get_transactions_page},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::ADMIN_LOG_IN_VIEW, get(get_admin_log_in_page))
        .route(endpoints::ADMIN_LOG_IN_API, post(post_admin_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let client_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .layer(middleware::from_fn_with_state(state.clone(), client_guard));

    let admin_routes = Router::new()
        .route(endpoints::ADMIN_INDEX_VIEW, get(get_admin_index_page))
        .route(endpoints::CLIENTS_VIEW, get(get_clients_page))
        .route(endpoints::NEW_CLIENT_VIEW, get(get_new_client_page))
        .route(endpoints::EDIT_CLIENT_VIEW, get(get_edit_client_page))
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page))
        .route(endpoints::NEW_ACCOUNT_VIEW, get(get_create_account_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::NEW_REPORT_VIEW, get(get_new_report_page))
        .layer(middleware::from_fn_with_state(state.clone(), admin_guard));

    // These POST/PUT/DELETE routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let admin_api_routes = Router::new()
        .route(endpoints::CLIENTS_API, post(create_client_endpoint))
        .route(
            endpoints::CLIENT_API,
            put(update_client_endpoint).delete(delete_client_endpoint),
        )
        .route(
            endpoints::CLIENT_SUMMARY_API,
            post(summarise_clients_endpoint),
        )
        .route(endpoints::ACCOUNTS_API, post(create_account_endpoint))
        .route(endpoints::DELETE_ACCOUNT, delete(delete_account_endpoint))
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(endpoints::REPORTS_API, post(create_report_endpoint))
        .route(endpoints::DELETE_REPORT, delete(delete_report_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), admin_guard_hx));

    admin_routes
        .merge(admin_api_routes)
        .merge(client_routes)
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the admin index page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::ADMIN_INDEX_VIEW)
}
