//! Defines functions for handling authentication with cookies.
//!
//! The session lives in a private (encrypted and signed) cookie holding a JSON
//! [Token]. A second, plain `logged_in` cookie tells the browser that a
//! client is logged in without exposing anything about the session.

use std::cmp::max;

use axum_extra::extract::{
    CookieJar, PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::token::{Subject, Token},
};

pub(crate) const COOKIE_TOKEN: &str = "token";
pub(crate) const COOKIE_LOGGED_IN: &str = "logged_in";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// Add an auth cookie to the cookie jar, indicating that `subject` is logged in and authenticated.
///
/// Sets the initial expiry of the cookie to `duration` from the current time.
/// You can use [DEFAULT_COOKIE_DURATION] for the default duration.
///
/// Returns the cookie jar with the cookie added.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the token cannot be serialized.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    subject: Subject,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;

    set_token_cookie(
        jar,
        &Token {
            subject,
            expires_at,
        },
    )
}

fn set_token_cookie(jar: PrivateCookieJar, token: &Token) -> Result<PrivateCookieJar, Error> {
    let token_string = serde_json::to_string(token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .path("/")
            .expires(token.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict),
    ))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict),
    )
}

/// Get the token from the auth cookie.
///
/// # Errors
///
/// Returns [Error::CookieMissing] if the cookie is not in the jar, holds an
/// invalid token or the token has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: Token =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::CookieMissing)?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::CookieMissing);
    }

    Ok(token)
}

/// Set the expiry of the auth cookie in `jar` to the latest of UTC now
/// plus `duration` and the token's current expiry.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns:
/// - [Error::CookieMissing] if there is no valid token in the cookie jar.
/// - [Error::JSONSerializationError] if the updated token cannot be serialized.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;
    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .unwrap_or(token.expires_at);

    let token = Token {
        expires_at: max(token.expires_at, new_expiry),
        ..token
    };

    set_token_cookie(jar, &token)
}

/// Set the plain cookie that marks a client as logged in.
pub(crate) fn set_logged_in_cookie(jar: CookieJar) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_LOGGED_IN, "True"))
            .path("/")
            .same_site(SameSite::Strict),
    )
}

/// Expire the plain logged in cookie.
pub(crate) fn clear_logged_in_cookie(jar: CookieJar) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_LOGGED_IN, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .same_site(SameSite::Strict),
    )
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        CookieJar, PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            cookie::{
                COOKIE_LOGGED_IN, COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, clear_logged_in_cookie,
                extend_auth_cookie_duration_if_needed, get_token_from_cookies,
                invalidate_auth_cookie, set_auth_cookie, set_logged_in_cookie,
            },
            token::{ClientSession, Subject},
        },
        client::ClientId,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    fn client_subject() -> Subject {
        Subject::Client(ClientSession {
            client_id: ClientId::new(1),
            client_name: "Ana".to_owned(),
        })
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_cookie() {
        let jar = set_auth_cookie(get_jar(), client_subject(), DEFAULT_COOKIE_DURATION).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();

        assert_eq!(token.subject, client_subject());
        assert_date_time_close!(
            token.expires_at,
            OffsetDateTime::now_utc() + Duration::minutes(5)
        );
        let cookie = jar.get(COOKIE_TOKEN).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.expires_datetime(), Some(token.expires_at));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jar = set_auth_cookie(get_jar(), Subject::Admin, Duration::seconds(-1)).unwrap();

        assert_eq!(get_token_from_cookies(&jar), Err(Error::CookieMissing));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let jar = get_jar().add(Cookie::new(COOKIE_TOKEN, "not json"));

        assert_eq!(get_token_from_cookies(&jar), Err(Error::CookieMissing));
    }

    #[test]
    fn can_extend_cookie_duration() {
        let jar = set_auth_cookie(get_jar(), Subject::Admin, DEFAULT_COOKIE_DURATION).unwrap();

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::minutes(10)).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();
        let cookie = jar.get(COOKIE_TOKEN).unwrap();
        let want = OffsetDateTime::now_utc() + Duration::minutes(10);
        assert_date_time_close!(token.expires_at, want);
        assert_date_time_close!(cookie.expires_datetime().unwrap(), want);
        assert_eq!(token.subject, Subject::Admin);
    }

    #[test]
    fn cookie_duration_does_not_shrink() {
        let jar = set_auth_cookie(get_jar(), client_subject(), Duration::days(7)).unwrap();
        let want = get_token_from_cookies(&jar).unwrap().expires_at;

        let jar = extend_auth_cookie_duration_if_needed(jar, DEFAULT_COOKIE_DURATION).unwrap();

        assert_eq!(get_token_from_cookies(&jar).unwrap().expires_at, want);
    }

    #[test]
    fn invalidate_auth_cookie_succeeds() {
        let jar = set_auth_cookie(get_jar(), client_subject(), DEFAULT_COOKIE_DURATION).unwrap();

        let jar = invalidate_auth_cookie(jar);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(get_token_from_cookies(&jar), Err(Error::CookieMissing));
    }

    #[test]
    fn logged_in_cookie_is_set_and_cleared() {
        let jar = set_logged_in_cookie(CookieJar::new());
        assert_eq!(jar.get(COOKIE_LOGGED_IN).unwrap().value(), "True");

        let jar = clear_logged_in_cookie(jar);
        let cookie = jar.get(COOKIE_LOGGED_IN).unwrap();
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
