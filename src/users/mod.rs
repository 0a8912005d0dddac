use axum::{middleware::from_fn_with_state, Router};

use crate::{auth::middleware::require_session, state::AppState};

pub mod dto;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

/// Every user route requires a session.
pub fn router(state: AppState) -> Router<AppState> {
    handlers::user_routes().route_layer(from_fn_with_state(state, require_session))
}
