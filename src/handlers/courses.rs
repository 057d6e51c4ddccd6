use axum::extract::State;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::access::{authorize, Action};
use crate::database::models::course::{CreateCourse, UpdateCourse};
use crate::database::models::Role;
use crate::database::resource::COURSES;
use crate::extract::{ApiJson, ApiPath, ApiQuery, QueryParams};
use crate::filter::{Filter, SqlParam};
use crate::middleware::response::{empty, ApiResponse, ApiResult};
use crate::middleware::CurrentUser;
use crate::services::{BootcampService, CourseService};
use crate::state::AppState;

const PUBLISHERS: &[Role] = &[Role::Publisher, Role::Admin];

/// GET /api/v1/courses
pub async fn list_courses(State(state): State<AppState>, ApiQuery(params): QueryParams) -> ApiResult<Vec<Value>> {
    let filter = Filter::from_params(&COURSES, &params, state.query_defaults())?.populate("bootcamp")?;
    let page = CourseService::new(&state.pool).list(filter).await?;
    Ok(ApiResponse::page(page))
}

/// GET /api/v1/bootcamps/:id/courses
pub async fn list_bootcamp_courses(
    State(state): State<AppState>,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
    ApiQuery(params): QueryParams,
) -> ApiResult<Vec<Value>> {
    BootcampService::new(&state.pool).get(bootcamp_id).await?;

    let filter = Filter::from_params(&COURSES, &params, state.query_defaults())?
        .where_eq("bootcamp", SqlParam::Uuid(bootcamp_id))?;
    let page = CourseService::new(&state.pool).list(filter).await?;
    Ok(ApiResponse::page(page))
}

/// GET /api/v1/courses/:id
pub async fn get_course(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Value> {
    let course = CourseService::new(&state.pool).get_json(id).await?;
    Ok(ApiResponse::success(course))
}

/// POST /api/v1/bootcamps/:id/courses
pub async fn add_course(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(bootcamp_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<CreateCourse>,
) -> ApiResult<Value> {
    let actor = user.require_role(PUBLISHERS)?;
    let bootcamp = BootcampService::new(&state.pool).get(bootcamp_id).await?;
    authorize(&bootcamp, &actor, Action::AddCourse)?;

    let new = body.validate()?;
    let course = CourseService::new(&state.pool).create(bootcamp.id, actor.id, new).await?;
    Ok(ApiResponse::created(course))
}

/// PUT /api/v1/courses/:id
pub async fn update_course(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateCourse>,
) -> ApiResult<Value> {
    let actor = user.require_role(PUBLISHERS)?;
    let service = CourseService::new(&state.pool);
    let course = service.get(id).await?;
    authorize(&course, &actor, Action::Update)?;

    let changes = body.validate()?;
    Ok(ApiResponse::success(service.update(&course, changes).await?))
}

/// DELETE /api/v1/courses/:id
pub async fn delete_course(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Map<String, Value>> {
    let actor = user.require_role(PUBLISHERS)?;
    let service = CourseService::new(&state.pool);
    let course = service.get(id).await?;
    authorize(&course, &actor, Action::Delete)?;

    service.delete(&course).await?;
    Ok(empty())
}
