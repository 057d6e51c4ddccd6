use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::filter::QueryDefaults;
use crate::geo::Geocoder;
use crate::mailer::Mailer;
use crate::storage::FileStorage;

/// Shared handles passed to every handler through axum's `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub geocoder: Arc<dyn Geocoder>,
    pub storage: Arc<dyn FileStorage>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn query_defaults(&self) -> QueryDefaults {
        QueryDefaults {
            default_limit: self.config.query.default_limit,
            max_limit: self.config.query.max_limit,
        }
    }
}
