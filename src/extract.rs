use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejection renders through the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
