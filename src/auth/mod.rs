use axum::{middleware::from_fn_with_state, Router};

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod validate;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(handlers::public_routes())
        .merge(
            handlers::protected_routes()
                .route_layer(from_fn_with_state(state, middleware::require_session)),
        )
}
