//! Geocoding collaborator and the radius search built on top of it.

pub mod mapquest;
pub mod radius;

use async_trait::async_trait;
use thiserror::Error;

pub use mapquest::MapQuestGeocoder;
pub use radius::{resolve, SearchArea, EARTH_RADIUS_MILES};

/// One geocoder candidate for an address or postal code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder transport error: {0}")]
    Transport(String),

    #[error("geocoder returned status {0}")]
    Status(u16),

    #[error("geocoder response could not be decoded: {0}")]
    Decode(String),
}

/// Resolves free-form addresses or postal codes to candidate points, best first.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Vec<GeoPoint>, GeocodeError>;
}
