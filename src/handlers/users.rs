//! Admin user management. The router gates this whole group behind `require_admin`.

use axum::extract::State;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::models::user::{CreateUser, UpdateUser};
use crate::database::models::UserProfile;
use crate::database::resource::USERS;
use crate::extract::{ApiJson, ApiPath, ApiQuery, QueryParams};
use crate::filter::Filter;
use crate::middleware::response::{empty, ApiResponse, ApiResult};
use crate::services::UserService;
use crate::state::AppState;

/// GET /api/v1/users
pub async fn list_users(State(state): State<AppState>, ApiQuery(params): QueryParams) -> ApiResult<Vec<Value>> {
    let filter = Filter::from_params(&USERS, &params, state.query_defaults())?;
    let page = UserService::new(&state.pool).list(filter).await?;
    Ok(ApiResponse::page(page))
}

/// GET /api/v1/users/:id
pub async fn get_user(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Value> {
    Ok(ApiResponse::success(UserService::new(&state.pool).get_json(id).await?))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateUser>,
) -> ApiResult<UserProfile> {
    let new = body.validate()?;
    let user = UserService::new(&state.pool).create(new).await?;
    Ok(ApiResponse::created(user.profile()))
}

/// PUT /api/v1/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateUser>,
) -> ApiResult<UserProfile> {
    let changes = body.validate()?;
    let user = UserService::new(&state.pool).update(id, changes).await?;
    Ok(ApiResponse::success(user.profile()))
}

/// DELETE /api/v1/users/:id
pub async fn delete_user(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Map<String, Value>> {
    UserService::new(&state.pool).delete(id).await?;
    Ok(empty())
}
