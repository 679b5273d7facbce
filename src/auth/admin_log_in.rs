//! The admin log-in page and the handler that checks the admin password.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, Query};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    auth::{
        admin_user::get_admin_password_hash,
        cookie::{invalidate_auth_cookie, set_auth_cookie},
        log_in::{
            INTERNAL_ERROR_MSG, LoginState, REMEMBER_ME_COOKIE_DURATION, RedirectQuery,
            parse_redirect_url, remember_me_and_submit,
        },
        token::Subject,
    },
    config::SiteConfig,
    endpoints,
    html::{base, log_in_card, password_input},
};

pub const INCORRECT_PASSWORD_ERROR_MSG: &str = "Incorrect password.";

pub const PASSWORD_NOT_SET_ERROR_MSG: &str =
    "Admin password not set, run set_admin_password to set it";

fn admin_log_in_form(error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::ADMIN_LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (password_input("", 0, error_message))

            (remember_me_and_submit())
        }
    }
}

/// Display the admin log-in page.
pub async fn get_admin_log_in_page(
    State(site): State<SiteConfig>,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "admin log-in query");
    let form = admin_log_in_form(None, redirect_url.as_deref());
    let content = log_in_card(&site.site_header, "Log in as admin", &form);

    base(&site.page_title("Log In"), &content).into_response()
}

/// The data entered in the admin log-in form.
#[derive(Deserialize)]
pub struct AdminLogInData {
    pub password: String,
    /// Set when the "remember me" checkbox is ticked.
    pub remember_me: Option<String>,
    pub redirect_url: Option<String>,
}

/// Handler for admin log-in requests.
///
/// On success the admin session cookie is set and the browser is redirected
/// to the admin index page, or the page the admin originally asked for.
pub async fn post_admin_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(log_in_data): Form<AdminLogInData>,
) -> Response {
    let redirect_url =
        parse_redirect_url(log_in_data.redirect_url.as_deref(), "admin log-in form");
    let redirect_url = redirect_url.as_deref();

    let password_hash = match state.db_connection.lock() {
        Ok(connection) => get_admin_password_hash(&connection),
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    let password_hash = match password_hash {
        Ok(password_hash) => password_hash,
        Err(Error::AdminPasswordNotSet) => {
            return admin_log_in_form(Some(PASSWORD_NOT_SET_ERROR_MSG), redirect_url)
                .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while getting the admin password: {error}");
            return admin_log_in_form(Some(INTERNAL_ERROR_MSG), redirect_url).into_response();
        }
    };

    match password_hash.verify(&log_in_data.password) {
        Ok(true) => {}
        Ok(false) => {
            return admin_log_in_form(Some(INCORRECT_PASSWORD_ERROR_MSG), redirect_url)
                .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying the admin password: {error}");
            return admin_log_in_form(Some(INTERNAL_ERROR_MSG), redirect_url).into_response();
        }
    }

    let cookie_duration = if log_in_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };
    let redirect_url = redirect_url.unwrap_or(endpoints::ADMIN_INDEX_VIEW);

    set_auth_cookie(jar.clone(), Subject::Admin, cookie_duration)
        .map(|updated_jar| {
            tracing::info!("Admin logged in");
            (
                StatusCode::SEE_OTHER,
                HxRedirect(redirect_url.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}
