use axum::{
    extract::{Path, RawQuery, State},
    routing::get,
    Extension, Router,
};
use tracing::{debug, instrument};

use super::{
    dto::{SearchParams, UserDto},
    services::UserService,
};
use crate::{
    auth::jwt::Claims,
    error::AppError,
    response::{paginate, ApiResponse},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/search", get(search_users))
        .route("/users/:id", get(get_user))
}

#[instrument(skip(svc, claims), fields(viewer = claims.id))]
pub async fn list_users(
    State(svc): State<UserService>,
    Extension(claims): Extension<Claims>,
) -> Result<ApiResponse<Vec<UserDto>>, AppError> {
    let users = svc.find_all().await?;
    let dto = users.into_iter().map(UserDto::from).collect();
    Ok(ApiResponse::ok(dto, "Fetch all data users success"))
}

#[instrument(skip(svc, claims), fields(viewer = claims.id))]
pub async fn search_users(
    State(svc): State<UserService>,
    Extension(claims): Extension<Claims>,
    RawQuery(query): RawQuery,
) -> Result<ApiResponse<UserDto>, AppError> {
    let params = SearchParams::from_query(query.as_deref());
    let (page, page_size) = (params.page(), params.page_size());
    let users = svc.search(&params.filter()).await?;

    let (items, pagination) = paginate(users, page, page_size);
    debug!(
        total = pagination.total_items,
        returned = items.len(),
        "search paginated"
    );
    let items = items.into_iter().map(UserDto::from).collect();
    Ok(ApiResponse::paginated(
        items,
        pagination,
        "Fetch all data users success",
    ))
}

#[instrument(skip(svc, claims), fields(viewer = claims.id))]
pub async fn get_user(
    State(svc): State<UserService>,
    Extension(claims): Extension<Claims>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<UserDto>, AppError> {
    let id = raw_id.parse::<i64>().map_err(|_| AppError::NotFound)?;
    let user = svc.find_by_id(id).await?;
    Ok(ApiResponse::ok(user.into(), "Fetch data users success"))
}
