use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{GeoPoint, GeocodeError, Geocoder};
use crate::config::GeocoderConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// MapQuest-compatible address endpoint (`/geocoding/v1/address`).
pub struct MapQuestGeocoder {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl MapQuestGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let endpoint = Url::parse(&config.base_url)
            .map_err(|e| GeocodeError::Transport(format!("invalid geocoder url: {e}")))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeoPoint>, GeocodeError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str()), ("location", query)])
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }
        let body = response.bytes().await.map_err(|e| GeocodeError::Transport(e.to_string()))?;
        parse_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ResponseDto {
    #[serde(default)]
    results: Vec<ResultDto>,
}

#[derive(Debug, Deserialize)]
struct ResultDto {
    #[serde(default)]
    locations: Vec<LocationDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationDto {
    lat_lng: LatLngDto,
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    admin_area5: Option<String>,
    #[serde(default)]
    admin_area3: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
    #[serde(default)]
    admin_area1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLngDto {
    lat: f64,
    lng: f64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_response(body: &[u8]) -> Result<Vec<GeoPoint>, GeocodeError> {
    let decoded: ResponseDto =
        serde_json::from_slice(body).map_err(|e| GeocodeError::Decode(e.to_string()))?;

    Ok(decoded
        .results
        .into_iter()
        .flat_map(|r| r.locations)
        .map(|loc| {
            let street = non_empty(loc.street);
            let city = non_empty(loc.admin_area5);
            let state = non_empty(loc.admin_area3);
            let zipcode = non_empty(loc.postal_code);
            let country = non_empty(loc.admin_area1);
            let formatted = [&street, &city, &state, &zipcode, &country]
                .iter()
                .filter_map(|p| p.as_deref())
                .collect::<Vec<_>>()
                .join(", ");
            GeoPoint {
                latitude: loc.lat_lng.lat,
                longitude: loc.lat_lng.lng,
                formatted_address: (!formatted.is_empty()).then_some(formatted),
                street,
                city,
                state,
                zipcode,
                country,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_candidates_in_order() {
        let body = br#"{"results":[{"locations":[
            {"latLng":{"lat":42.35,"lng":-71.06},"street":"233 Bay State Rd","adminArea5":"Boston",
             "adminArea3":"MA","postalCode":"02215","adminArea1":"US"},
            {"latLng":{"lat":40.0,"lng":-70.0},"street":"","adminArea5":"Elsewhere"}
        ]}]}"#;
        let points = parse_response(body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].latitude, 42.35);
        assert_eq!(points[0].city.as_deref(), Some("Boston"));
        assert_eq!(
            points[0].formatted_address.as_deref(),
            Some("233 Bay State Rd, Boston, MA, 02215, US")
        );
        assert_eq!(points[1].street, None);
    }

    #[test]
    fn empty_results_yield_no_candidates() {
        assert!(parse_response(br#"{"results":[]}"#).unwrap().is_empty());
        assert!(parse_response(b"not json").is_err());
    }
}
