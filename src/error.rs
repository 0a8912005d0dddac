use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::{
    response::{ApiResponse, ErrorDetail, FieldErrors},
    users::repo::StoreError,
};

const GENERIC_ERROR: &str = "An unexpected error occurred";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("record not found")]
    NotFound,

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "json body rejected");
        AppError::BadRequest("Invalid request".into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "Invalid request".to_string(),
                ErrorDetail::Fields(fields),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                msg,
                ErrorDetail::Text(GENERIC_ERROR.into()),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized".to_string(),
                ErrorDetail::Text("Unauthorized access".into()),
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "User not found".to_string(),
                ErrorDetail::Text("record not found".into()),
            ),
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    ErrorDetail::Text(GENERIC_ERROR.into()),
                )
            }
        };
        ApiResponse::failure(status, message, detail).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn status_and_body(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json"))
    }

    #[tokio::test]
    async fn unauthorized_does_not_leak_detail() {
        let (status, json) = status_and_body(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Unauthorized");
        assert_eq!(json["error"], "Unauthorized access");
    }

    #[tokio::test]
    async fn backend_failures_are_generic_500s() {
        for err in [
            AppError::Config("JWT secret missing".into()),
            AppError::Transport("channel closed".into()),
            AppError::Persistence(StoreError::Duplicate("users_email_key".into())),
            AppError::Internal(anyhow::anyhow!("boom")),
        ] {
            let (status, json) = status_and_body(err).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(json["statusCode"], 500);
            assert_eq!(json["error"], GENERIC_ERROR);
        }
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, json) = status_and_body(AppError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "User not found");
    }
}
