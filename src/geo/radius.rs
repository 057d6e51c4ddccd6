use serde::Serialize;

use super::Geocoder;
use crate::error::ApiError;

/// Earth's mean radius in miles; the divisor that turns miles into radians.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Centre point and angular radius (radians) of a spherical search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchArea {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
}

/// Geocodes `postal_code` and converts `distance_miles` into an angular radius.
pub async fn resolve(
    geocoder: &dyn Geocoder,
    postal_code: &str,
    distance_miles: f64,
) -> Result<SearchArea, ApiError> {
    if !distance_miles.is_finite() || distance_miles < 0.0 {
        return Err(ApiError::validation_error(
            format!("Invalid distance: {}", distance_miles),
            None,
        ));
    }

    let candidates = geocoder.geocode(postal_code).await?;
    let Some(first) = candidates.into_iter().next() else {
        return Err(ApiError::not_found(format!(
            "No location found for zipcode {}",
            postal_code
        )));
    };

    Ok(SearchArea {
        latitude: first.latitude,
        longitude: first.longitude,
        radius: distance_miles / EARTH_RADIUS_MILES,
    })
}
