use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "jwt";

/// Gate for protected routes: requires a valid session cookie and exposes
/// its claims to handlers through request extensions.
pub async fn require_session(
    State(keys): State<JwtKeys>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            warn!(path = %req.uri().path(), "missing session cookie");
            AppError::Unauthorized
        })?;

    let claims = keys.validate(&token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub fn session_cookie(token: String, expires: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .expires(expires)
        .build()
}

/// Same cookie with an empty value and an expiry in the past.
pub fn expired_session_cookie() -> Cookie<'static> {
    session_cookie(String::new(), OffsetDateTime::now_utc() - Duration::hours(1))
}
