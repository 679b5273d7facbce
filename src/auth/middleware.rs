//! Authentication middleware that validates cookies, extends sessions, and handles redirects.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
        token::Subject,
    },
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// The kind of session a group of routes is restricted to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Audience {
    Admin,
    Client,
}

impl Audience {
    fn log_in_view(self) -> &'static str {
        match self {
            Audience::Admin => endpoints::ADMIN_LOG_IN_VIEW,
            Audience::Client => endpoints::LOG_IN_VIEW,
        }
    }

    fn landing_view(self) -> &'static str {
        match self {
            Audience::Admin => endpoints::ADMIN_INDEX_VIEW,
            Audience::Client => endpoints::DASHBOARD_VIEW,
        }
    }
}

/// Checks for a valid auth cookie whose subject belongs to `audience`.
///
/// For client sessions the [ClientSession](crate::auth::ClientSession) is
/// placed into the request extensions. Sessions for the other audience are
/// treated the same as a missing cookie and get the redirect from `get_redirect`.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    audience: Audience,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_view = audience.log_in_view();
    let log_in_redirect_url =
        build_log_in_redirect_url(&request, log_in_view).unwrap_or_else(|| {
            if request.uri().path().starts_with("/api") {
                tracing::warn!(
                    "Missing or invalid HTMX headers for /api request. Falling back to landing page."
                );
            } else {
                tracing::warn!(
                    "Invalid redirect URL from request URI. Falling back to landing page."
                );
            }

            build_log_in_redirect_url_from_target(audience.landing_view(), log_in_view)
                .unwrap_or_else(|| log_in_view.to_owned())
        });

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return get_redirect(&log_in_redirect_url);
        }
    };
    let subject = match get_token_from_cookies(&jar) {
        Ok(token) => token.subject,
        Err(_) => return get_redirect(&log_in_redirect_url),
    };

    match (audience, subject) {
        (Audience::Admin, Subject::Admin) => {}
        (Audience::Client, Subject::Client(session)) => {
            parts.extensions.insert(session);
        }
        (audience, subject) => {
            tracing::debug!("{subject:?} session cannot access {audience:?} routes.");
            return get_redirect(&log_in_redirect_url);
        }
    }

    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

fn redirect(url: &str) -> Response {
    Redirect::to(url).into_response()
}

fn hx_redirect(url: &str) -> Response {
    (HxRedirect(url.to_owned()), StatusCode::OK).into_response()
}

/// Middleware for admin pages that checks for a valid admin session,
/// otherwise a redirect to the admin log-in page is returned.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key` for decrypting and verifying the cookie contents.
pub async fn admin_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, Audience::Admin, request, next, redirect).await
}

/// Middleware for admin API routes that checks for a valid admin session,
/// otherwise a HTMX redirect to the admin log-in page is returned.
pub async fn admin_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, Audience::Admin, request, next, hx_redirect).await
}

/// Middleware for client pages that checks for a valid client session.
/// The client session is placed into the request and then the request executed normally if the cookie is valid, otherwise a redirect to the log-in page is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(session): Extension<ClientSession>` to receive the session.
pub async fn client_guard(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, Audience::Client, request, next, redirect).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Router,
        extract::{Path, State},
        middleware,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use axum_test::TestServer;
    use sha2::Digest;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            COOKIE_TOKEN, ClientSession, DEFAULT_COOKIE_DURATION,
            cookie::set_auth_cookie,
            middleware::{AuthState, admin_guard, admin_guard_hx, client_guard},
            token::Subject,
        },
        client::ClientId,
        endpoints::{self, format_endpoint},
    };

    async fn test_handler() -> &'static str {
        "Hello, World!"
    }

    async fn client_handler(Extension(session): Extension<ClientSession>) -> String {
        session.client_name
    }

    async fn stub_admin_log_in(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, Subject::Admin, state.cookie_duration)
    }

    async fn stub_client_log_in(
        State(state): State<AuthState>,
        Path(client_id): Path<i64>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        let session = ClientSession {
            client_id: ClientId::new(client_id),
            client_name: "Ana".to_owned(),
        };

        set_auth_cookie(jar, Subject::Client(session), state.cookie_duration)
    }

    const TEST_ADMIN_LOG_IN: &str = "/test/admin_log_in";
    const TEST_CLIENT_LOG_IN: &str = "/test/client_log_in/{client_id}";
    const TEST_ADMIN_ROUTE: &str = "/admin/protected";
    const TEST_CLIENT_ROUTE: &str = "/dashboard";
    const TEST_API_ROUTE: &str = "/api/protected";

    fn get_test_server(cookie_duration: Duration) -> TestServer {
        let hash = sha2::Sha512::digest("nafstenoas");
        let state = AuthState {
            cookie_key: Key::from(&hash),
            cookie_duration,
        };

        let admin_routes = Router::new()
            .route(TEST_ADMIN_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard));
        let admin_api_routes = Router::new()
            .route(TEST_API_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard_hx));
        let client_routes = Router::new()
            .route(TEST_CLIENT_ROUTE, get(client_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), client_guard));

        let app = Router::new()
            .merge(admin_routes)
            .merge(admin_api_routes)
            .merge(client_routes)
            .route(TEST_ADMIN_LOG_IN, post(stub_admin_log_in))
            .route(TEST_CLIENT_LOG_IN, post(stub_client_log_in))
            .with_state(state);

        TestServer::new(app)
    }

    fn expected_location(log_in_view: &str, redirect_url: &str) -> String {
        let expected_query = serde_urlencoded::to_string([("redirect_url", redirect_url)]).unwrap();
        format!("{log_in_view}?{expected_query}")
    }

    #[tokio::test]
    async fn get_admin_route_with_valid_cookie() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(TEST_ADMIN_LOG_IN).await;

        response.assert_status_ok();
        let token_cookie = response.cookie(COOKIE_TOKEN);

        server
            .get(TEST_ADMIN_ROUTE)
            .add_cookie(token_cookie)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn client_route_receives_session() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server
            .post(&format_endpoint(TEST_CLIENT_LOG_IN, 3))
            .await;
        let token_cookie = response.cookie(COOKIE_TOKEN);

        let response = server
            .get(TEST_CLIENT_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "Ana");
    }

    #[tokio::test]
    async fn client_session_cannot_access_admin_route() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server
            .post(&format_endpoint(TEST_CLIENT_LOG_IN, 3))
            .await;
        let token_cookie = response.cookie(COOKIE_TOKEN);

        let response = server
            .get(TEST_ADMIN_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_location(endpoints::ADMIN_LOG_IN_VIEW, TEST_ADMIN_ROUTE)
        );
    }

    #[tokio::test]
    async fn admin_session_cannot_access_client_route() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let token_cookie = server.post(TEST_ADMIN_LOG_IN).await.cookie(COOKIE_TOKEN);

        let response = server
            .get(TEST_CLIENT_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_location(endpoints::LOG_IN_VIEW, TEST_CLIENT_ROUTE)
        );
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {:?}, want {:?}",
            left,
            right
        );
    }

    #[tokio::test]
    async fn auth_guard_extends_valid_cookie_duration() {
        let server = get_test_server(Duration::seconds(5));
        let response = server.post(TEST_ADMIN_LOG_IN).await;

        response.assert_status_ok();
        let response_time = OffsetDateTime::now_utc();
        let jar = response.cookies();
        assert_date_time_close(
            jar.get(COOKIE_TOKEN).unwrap().expires_datetime().unwrap(),
            response_time + Duration::seconds(5),
        );

        let response = server.get(TEST_ADMIN_ROUTE).add_cookies(jar).await;

        let auth_cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            auth_cookie.expires_datetime().unwrap(),
            response_time + Duration::seconds(5),
        );
        assert_eq!(auth_cookie.http_only(), Some(true));
        assert_eq!(auth_cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn get_admin_route_with_no_auth_cookie_redirects_to_admin_log_in() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.get(TEST_ADMIN_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_location(endpoints::ADMIN_LOG_IN_VIEW, TEST_ADMIN_ROUTE)
        );
    }

    #[tokio::test]
    async fn get_client_route_with_invalid_auth_cookie_redirects_to_log_in() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server
            .get(TEST_CLIENT_ROUTE)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "FOOBAR")).build())
            .await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            expected_location(endpoints::LOG_IN_VIEW, TEST_CLIENT_ROUTE)
        );
    }

    #[tokio::test]
    async fn get_admin_route_with_expired_auth_cookie_redirects_to_log_in() {
        let server = get_test_server(Duration::seconds(-1));
        let token_cookie = server.post(TEST_ADMIN_LOG_IN).await.cookie(COOKIE_TOKEN);

        let response = server
            .get(TEST_ADMIN_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_see_other();
    }

    #[tokio::test]
    async fn api_route_uses_hx_current_url_for_redirect() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let current_url = "/admin/clients?year=2024&month=3";
        let response = server
            .get(TEST_API_ROUTE)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("hx-redirect"),
            expected_location(endpoints::ADMIN_LOG_IN_VIEW, current_url)
        );
    }
}
