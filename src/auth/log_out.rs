//! Log out for both admin and client sessions.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::{CookieJar, PrivateCookieJar};

use crate::{
    auth::cookie::{clear_logged_in_cookie, invalidate_auth_cookie},
    endpoints,
};

/// Invalidate the auth cookie and the logged in cookie, then redirect to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar, plain_jar: CookieJar) -> Response {
    (
        invalidate_auth_cookie(jar),
        clear_logged_in_cookie(plain_jar),
        Redirect::to(endpoints::LOG_IN_VIEW),
    )
        .into_response()
}
