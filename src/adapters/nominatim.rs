use crate::core::GeocodingService;
use crate::domain::model::Coordinates;
use crate::domain::ports::LookupError;
use crate::utils::error::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "fortiline_florida_map";

/// OpenStreetMap Nominatim forward geocoding (`/search`).
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimGeocoder {
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub fn new(endpoint: impl Into<String>, user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.endpoint.trim_end_matches('/'))
    }
}

impl GeocodingService for NominatimGeocoder {
    async fn lookup(
        &self,
        address: &str,
        timeout: Duration,
    ) -> std::result::Result<Option<Coordinates>, LookupError> {
        tracing::debug!("Nominatim lookup: {}", address);

        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", address), ("format", "jsonv2"), ("limit", "1")])
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }

        let places: Vec<Place> = response.json().await.map_err(classify_error)?;
        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        tracing::debug!(
            "Resolved '{}' to {}",
            address,
            place.display_name.as_deref().unwrap_or("<unnamed place>")
        );

        let latitude = parse_degrees("lat", &place.lat)?;
        let longitude = parse_degrees("lon", &place.lon)?;
        Coordinates::new(latitude, longitude)
            .map(Some)
            .ok_or_else(|| {
                LookupError::Permanent(format!(
                    "coordinates out of range: ({}, {})",
                    latitude, longitude
                ))
            })
    }
}

fn parse_degrees(field: &str, raw: &str) -> std::result::Result<f64, LookupError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| LookupError::Permanent(format!("invalid {} '{}': {}", field, raw, e)))
}

fn classify_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        LookupError::Transient(err.to_string())
    } else {
        LookupError::Permanent(err.to_string())
    }
}

fn classify_status(status: StatusCode) -> LookupError {
    let message = format!("HTTP {}", status);
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        LookupError::Transient(message)
    } else {
        LookupError::Permanent(message)
    }
}
