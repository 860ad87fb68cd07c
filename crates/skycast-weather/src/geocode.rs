//! Reverse geocoding: convert coordinates to a display name.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Skycast/0.1 (forecast display)";

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<ReverseAddress>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

/// Resolve a coordinate pair to a place name (e.g. "London, United Kingdom").
/// Returns `None` on any failure; the caller falls back to raw coordinates.
pub async fn reverse_geocode(latitude: f64, longitude: f64) -> Option<String> {
    let client = match Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Failed to create geocoding client: {}", e);
            return None;
        }
    };

    let url = format!(
        "{NOMINATIM_URL}?lat={latitude}&lon={longitude}&format=json&addressdetails=1&zoom=10"
    );

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Reverse geocode request failed: {}", e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!("Reverse geocode returned status {}", response.status());
        return None;
    }

    let body: ReverseResponse = match response.json().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("Reverse geocode parse error: {}", e);
            return None;
        }
    };

    let addr = body.address?;
    let country = addr.country;

    // Prefer the most specific populated place available.
    let place = addr.city.or(addr.town).or(addr.village).or(addr.county)?;

    let result = match country {
        Some(c) if !c.is_empty() && c != place => format!("{place}, {c}"),
        _ => place,
    };

    tracing::info!("Reverse geocoded to: {}", result);
    Some(result)
}
