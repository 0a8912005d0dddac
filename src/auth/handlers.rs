use axum::{extract::State, http::StatusCode, routing::post, Router};
use axum_extra::extract::cookie::CookieJar;
use time::OffsetDateTime;
use tracing::{instrument, warn};

use super::{
    dto::{LoginRequest, RegisterRequest},
    middleware::{expired_session_cookie, session_cookie, SESSION_COOKIE},
    validate::validate_registration,
};
use crate::{
    error::AppError,
    extract::AppJson,
    response::ApiResponse,
    state::AppState,
    users::{
        dto::UserDto,
        services::{Session, UserService},
    },
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/refresh-token", post(refresh_token))
}

fn with_session_cookie(jar: CookieJar, session: &Session) -> Result<CookieJar, AppError> {
    let expires = OffsetDateTime::from_unix_timestamp(session.claims.exp)
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(jar.add(session_cookie(session.token.clone(), expires)))
}

#[instrument(skip(svc, payload), fields(username = %payload.username))]
pub async fn register(
    State(svc): State<UserService>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<ApiResponse<()>, AppError> {
    if let Err(e) = validate_registration(&payload) {
        warn!(error = %e, "registration rejected");
        return Err(e);
    }

    svc.register(payload.into()).await?;
    Ok(ApiResponse::empty(StatusCode::CREATED, "Register successful"))
}

#[instrument(skip(svc, jar, payload), fields(username = %payload.username))]
pub async fn login(
    State(svc): State<UserService>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<UserDto>), AppError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "username and password are required".into(),
        ));
    }

    let session = match svc.login(&payload.username, &payload.password).await {
        Ok(s) => s,
        Err(AppError::NotFound) => {
            warn!("login unknown username");
            return Err(AppError::Unauthorized);
        }
        Err(e) => return Err(e),
    };

    let jar = with_session_cookie(jar, &session)?;
    Ok((jar, ApiResponse::ok(session.user.into(), "Login successful")))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<()>) {
    (
        jar.add(expired_session_cookie()),
        ApiResponse::empty(StatusCode::OK, "Logout successful"),
    )
}

#[instrument(skip(svc, jar))]
pub async fn refresh_token(
    State(svc): State<UserService>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<()>), AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .ok_or(AppError::Unauthorized)?;

    let session = svc.refresh(&token).await?;
    let jar = with_session_cookie(jar, &session)?;
    Ok((
        jar,
        ApiResponse::empty(StatusCode::OK, "Token refreshed successful"),
    ))
}
