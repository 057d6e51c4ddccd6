use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::access::{authorize, Action};
use crate::database::models::bootcamp::{CreateBootcamp, UpdateBootcamp};
use crate::database::models::Role;
use crate::database::resource::BOOTCAMPS;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, QueryParams};
use crate::filter::Filter;
use crate::geo::{self, GeoPoint, Geocoder};
use crate::middleware::response::{empty, ApiResponse, ApiResult};
use crate::middleware::CurrentUser;
use crate::services::BootcampService;
use crate::state::AppState;
use crate::storage::{self, UploadedFile};

const PUBLISHERS: &[Role] = &[Role::Publisher, Role::Admin];

/// GET /api/v1/bootcamps
pub async fn list_bootcamps(State(state): State<AppState>, ApiQuery(params): QueryParams) -> ApiResult<Vec<Value>> {
    let filter = Filter::from_params(&BOOTCAMPS, &params, state.query_defaults())?;
    let page = BootcampService::new(&state.pool).list(filter).await?;
    Ok(ApiResponse::page(page))
}

/// GET /api/v1/bootcamps/radius/:zipcode/:distance
pub async fn bootcamps_in_radius(
    State(state): State<AppState>,
    ApiPath((zipcode, distance)): ApiPath<(String, String)>,
    ApiQuery(params): QueryParams,
) -> ApiResult<Vec<Value>> {
    let distance: f64 = distance
        .parse()
        .map_err(|_| ApiError::validation_error(format!("Invalid distance: {}", distance), None))?;
    let area = geo::resolve(state.geocoder.as_ref(), &zipcode, distance).await?;

    let filter = Filter::from_params(&BOOTCAMPS, &params, state.query_defaults())?.within_sphere(&area);
    let page = BootcampService::new(&state.pool).list(filter).await?;
    Ok(ApiResponse::page(page))
}

/// GET /api/v1/bootcamps/:id
pub async fn get_bootcamp(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Value> {
    let bootcamp = BootcampService::new(&state.pool).get_json(id).await?;
    Ok(ApiResponse::success(bootcamp))
}

/// POST /api/v1/bootcamps
pub async fn create_bootcamp(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<CreateBootcamp>,
) -> ApiResult<Value> {
    let actor = user.require_role(PUBLISHERS)?;
    let new = body.validate()?;
    let service = BootcampService::new(&state.pool);

    // Fast path; the partial unique index settles concurrent creates
    if actor.role != Role::Admin && service.has_published(actor.id).await? {
        return Err(ApiError::conflict(format!(
            "The user with ID {} has already published a bootcamp",
            actor.id
        )));
    }

    let location = geocode_address(state.geocoder.as_ref(), &new.address).await?;
    let bootcamp = service.create(&actor, new, location).await?;
    Ok(ApiResponse::created(bootcamp))
}

/// PUT /api/v1/bootcamps/:id
pub async fn update_bootcamp(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateBootcamp>,
) -> ApiResult<Value> {
    let actor = user.require_role(PUBLISHERS)?;
    let service = BootcampService::new(&state.pool);
    let bootcamp = service.get(id).await?;
    authorize(&bootcamp, &actor, Action::Update)?;

    let changes = body.validate()?;
    let location = match changes.address.as_deref() {
        Some(address) => Some(geocode_address(state.geocoder.as_ref(), address).await?),
        None => None,
    };
    let updated = service.update(id, changes, location).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/bootcamps/:id
pub async fn delete_bootcamp(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Map<String, Value>> {
    let actor = user.require_role(PUBLISHERS)?;
    let service = BootcampService::new(&state.pool);
    let bootcamp = service.get(id).await?;
    authorize(&bootcamp, &actor, Action::Delete)?;

    service.delete(id).await?;
    Ok(empty())
}

/// PUT /api/v1/bootcamps/:id/photo
pub async fn upload_photo(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<String> {
    let actor = user.require_role(PUBLISHERS)?;
    let service = BootcampService::new(&state.pool);
    let bootcamp = service.get(id).await?;
    authorize(&bootcamp, &actor, Action::UploadPhoto)?;

    let max = state.config.uploads.max_file_upload;
    let mut multipart = multipart.map_err(|_| ApiError::upload("Please upload a file"))?;
    let file = read_file_field(&mut multipart, max).await?.ok_or_else(|| ApiError::upload("Please upload a file"))?;
    storage::validate_image(&file, max)?;

    let file_name = storage::photo_file_name(bootcamp.id, file.file_name.as_deref());
    state.storage.store(&file_name, &file.bytes).await?;
    service.set_photo(bootcamp.id, &file_name).await?;

    tracing::info!(bootcamp = %bootcamp.id, file = %file_name, "Photo uploaded");
    Ok(ApiResponse::success(file_name))
}

async fn read_file_field(multipart: &mut Multipart, max: usize) -> Result<Option<UploadedFile>, ApiError> {
    let too_large = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::upload(format!("Please upload an image less than {}", max))
        } else {
            ApiError::from(e)
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(&too_large)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(&too_large)?;
        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// First geocoder candidate for a bootcamp address.
async fn geocode_address(geocoder: &dyn Geocoder, address: &str) -> Result<GeoPoint, ApiError> {
    geocoder
        .geocode(address)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::validation_error(format!("Could not geocode address: {}", address), None))
}
