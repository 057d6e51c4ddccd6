pub mod bootcamp_service;
pub mod course_service;
pub mod review_service;
pub mod user_service;

pub use bootcamp_service::BootcampService;
pub use course_service::CourseService;
pub use review_service::ReviewService;
pub use user_service::UserService;

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::QueryBuilder;
use crate::error::ApiError;
use crate::filter::{Filter, Page, QueryDefaults, ResourceDef, SqlParam};

/// Loads one resource by id in its response shape, with the named relations attached.
pub(crate) async fn fetch_json(
    pool: &PgPool,
    resource: &'static ResourceDef,
    id: Uuid,
    populate: &[&str],
) -> Result<Option<Value>, ApiError> {
    let mut filter = Filter::new(resource, QueryDefaults::default()).where_eq("id", SqlParam::Uuid(id))?;
    for relation in populate {
        filter = filter.populate(relation)?;
    }
    Ok(QueryBuilder::new(filter).select_optional(pool).await?)
}

/// Runs a list query and returns the page together with the filtered total.
pub(crate) async fn fetch_page(pool: &PgPool, filter: Filter) -> Result<Page<Value>, ApiError> {
    Ok(QueryBuilder::new(filter).page(pool).await?)
}
