use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use super::publisher::publish_text;
use crate::state::AppState;

/// A missing `message` publishes an empty body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PublishRequest {
    pub message: String,
}

pub fn publish_routes() -> Router<AppState> {
    Router::new().route("/publish", post(publish))
}

#[instrument(skip(state, body))]
pub async fn publish(
    State(state): State<AppState>,
    body: Result<Json<PublishRequest>, JsonRejection>,
) -> (StatusCode, &'static str) {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e.body_text(), "publish body rejected");
            return (StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    let queue = &state.config.broker.queue;
    match publish_text(state.publisher.as_ref(), queue, &body.message).await {
        Ok(()) => {
            info!(%queue, "message published");
            (StatusCode::OK, "Message published to queue")
        }
        Err(e) => {
            error!(error = %e, %queue, "publish failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to publish message")
        }
    }
}
