//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/clients/{client_id}', use [format_endpoint].

/// The root route which redirects to the admin index page.
pub const ROOT: &str = "/";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// The route for getting the client log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The landing page for logged in clients.
pub const DASHBOARD_VIEW: &str = "/dashboard";

/// The route for getting the admin log in page.
pub const ADMIN_LOG_IN_VIEW: &str = "/admin/log_in";
/// The landing page of the admin site.
pub const ADMIN_INDEX_VIEW: &str = "/admin";
/// The page listing clients with their monthly transaction count.
pub const CLIENTS_VIEW: &str = "/admin/clients";
/// The page for creating a new client.
pub const NEW_CLIENT_VIEW: &str = "/admin/clients/new";
/// The page for editing an existing client.
pub const EDIT_CLIENT_VIEW: &str = "/admin/clients/{client_id}/edit";
/// The page listing all accounts.
pub const ACCOUNTS_VIEW: &str = "/admin/accounts";
/// The page for opening a new account.
pub const NEW_ACCOUNT_VIEW: &str = "/admin/accounts/new";
/// The page listing recent transactions.
pub const TRANSACTIONS_VIEW: &str = "/admin/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/admin/transactions/new";
/// The page listing reports.
pub const REPORTS_VIEW: &str = "/admin/reports";
/// The page for creating a new report.
pub const NEW_REPORT_VIEW: &str = "/admin/reports/new";

/// The route for logging in a client.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for logging in the admin.
pub const ADMIN_LOG_IN_API: &str = "/api/admin/log_in";
/// The route to log out the current client or admin.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create a client.
pub const CLIENTS_API: &str = "/api/clients";
/// The route to update or delete a client.
pub const CLIENT_API: &str = "/api/clients/{client_id}";
/// The route for summarising the transactions of the selected clients.
pub const CLIENT_SUMMARY_API: &str = "/api/admin/clients/summary";
/// The route to open an account.
pub const ACCOUNTS_API: &str = "/api/accounts";
/// The route to delete an account.
pub const DELETE_ACCOUNT: &str = "/api/accounts/{account_id}";
/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to create a report.
pub const REPORTS_API: &str = "/api/reports";
/// The route to delete a report.
pub const DELETE_REPORT: &str = "/api/reports/{report_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/clients/{client_id}', '{client_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
