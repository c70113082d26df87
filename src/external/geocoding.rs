use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    /// Google's location_type, e.g. ROOFTOP or APPROXIMATE
    pub confidence: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeEntry>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeEntry {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
    #[serde(default)]
    location_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Google Maps Geocoding client. Without an API key every lookup yields `None`.
#[derive(Clone)]
pub struct GeocodingService {
    client: Client,
    api_key: String,
}

impl GeocodingService {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub async fn geocode(&self, address: &str) -> AppResult<Option<GeocodeResult>> {
        self.lookup(&[("address", address)]).await
    }

    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> AppResult<Option<GeocodeResult>> {
        let latlng = format!("{lat},{lng}");
        self.lookup(&[("latlng", latlng.as_str())]).await
    }

    async fn lookup(&self, params: &[(&str, &str)]) -> AppResult<Option<GeocodeResult>> {
        if !self.is_enabled() {
            return Ok(None);
        }
        let response = self
            .client
            .get(GEOCODE_ENDPOINT)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Geocoding returned HTTP {}",
                response.status().as_u16()
            )));
        }
        let body: GeocodeResponse = response.json().await?;
        parse_response(body)
    }
}

fn parse_response(body: GeocodeResponse) -> AppResult<Option<GeocodeResult>> {
    match body.status.as_str() {
        "OK" => Ok(body.results.into_iter().next().map(|entry| GeocodeResult {
            latitude: entry.geometry.location.lat,
            longitude: entry.geometry.location.lng,
            formatted_address: entry.formatted_address,
            confidence: entry
                .geometry
                .location_type
                .unwrap_or_else(|| "unknown".to_string()),
        })),
        "ZERO_RESULTS" => Ok(None),
        other => Err(AppError::ExternalApiError(format!(
            "Geocoding failed: {} {}",
            other,
            body.error_message.unwrap_or_default()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ok_response() {
        let body: GeocodeResponse = serde_json::from_str(
            r#"{"status":"OK","results":[{"formatted_address":"Wuse 2, Abuja, Nigeria",
                "geometry":{"location":{"lat":9.0765,"lng":7.4893},"location_type":"APPROXIMATE"}}]}"#,
        )
        .unwrap();
        let result = parse_response(body).unwrap().unwrap();
        assert_eq!(result.latitude, 9.0765);
        assert_eq!(result.confidence, "APPROXIMATE");
    }

    #[test]
    fn test_zero_results_is_none() {
        let body: GeocodeResponse =
            serde_json::from_str(r#"{"status":"ZERO_RESULTS","results":[]}"#).unwrap();
        assert_eq!(parse_response(body).unwrap(), None);
    }

    #[test]
    fn test_denied_is_error() {
        let body: GeocodeResponse = serde_json::from_str(
            r#"{"status":"REQUEST_DENIED","error_message":"bad key"}"#,
        )
        .unwrap();
        assert!(parse_response(body).is_err());
    }

    #[actix_web::test]
    async fn test_disabled_without_key() {
        let svc = GeocodingService::new(String::new());
        assert!(svc.geocode("Wuse 2, Abuja").await.unwrap().is_none());
    }
}
