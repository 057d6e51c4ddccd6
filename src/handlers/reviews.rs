use axum::extract::State;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::access::{authorize, Action};
use crate::database::models::review::{CreateReview, UpdateReview};
use crate::database::models::Role;
use crate::database::resource::REVIEWS;
use crate::extract::{ApiJson, ApiPath, ApiQuery, QueryParams};
use crate::filter::{Filter, SqlParam};
use crate::middleware::response::{empty, ApiResponse, ApiResult};
use crate::middleware::CurrentUser;
use crate::services::{BootcampService, ReviewService};
use crate::state::AppState;

/// Publishers manage bootcamps; reviews come from regular users.
const REVIEWERS: &[Role] = &[Role::User, Role::Admin];

/// GET /api/v1/reviews
pub async fn list_reviews(State(state): State<AppState>, ApiQuery(params): QueryParams) -> ApiResult<Vec<Value>> {
    let filter = Filter::from_params(&REVIEWS, &params, state.query_defaults())?.populate("bootcamp")?;
    let page = ReviewService::new(&state.pool).list(filter).await?;
    Ok(ApiResponse::page(page))
}

/// GET /api/v1/bootcamps/:id/reviews
pub async fn list_bootcamp_reviews(
    State(state): State<AppState>,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
    ApiQuery(params): QueryParams,
) -> ApiResult<Vec<Value>> {
    BootcampService::new(&state.pool).get(bootcamp_id).await?;

    let filter = Filter::from_params(&REVIEWS, &params, state.query_defaults())?
        .where_eq("bootcamp", SqlParam::Uuid(bootcamp_id))?;
    let page = ReviewService::new(&state.pool).list(filter).await?;
    Ok(ApiResponse::page(page))
}

/// GET /api/v1/reviews/:id
pub async fn get_review(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Value> {
    let review = ReviewService::new(&state.pool).get_json(id).await?;
    Ok(ApiResponse::success(review))
}

/// POST /api/v1/bootcamps/:id/reviews
pub async fn add_review(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<CreateReview>,
) -> ApiResult<Value> {
    let actor = user.require_role(REVIEWERS)?;
    let bootcamp = BootcampService::new(&state.pool).get(bootcamp_id).await?;

    let new = body.validate()?;
    let review = ReviewService::new(&state.pool).create(bootcamp.id, actor.id, new).await?;
    Ok(ApiResponse::created(review))
}

/// PUT /api/v1/reviews/:id
pub async fn update_review(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateReview>,
) -> ApiResult<Value> {
    let actor = user.require_role(REVIEWERS)?;
    let service = ReviewService::new(&state.pool);
    let review = service.get(id).await?;
    authorize(&review, &actor, Action::Update)?;

    let changes = body.validate()?;
    Ok(ApiResponse::success(service.update(&review, changes).await?))
}

/// DELETE /api/v1/reviews/:id
pub async fn delete_review(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Map<String, Value>> {
    let actor = user.require_role(REVIEWERS)?;
    let service = ReviewService::new(&state.pool);
    let review = service.get(id).await?;
    authorize(&review, &actor, Action::Delete)?;

    service.delete(&review).await?;
    Ok(empty())
}
