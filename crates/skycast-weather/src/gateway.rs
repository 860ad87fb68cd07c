//! Remote forecast gateway.
//!
//! [`WeatherGateway`] is the seam the session fetches through;
//! [`OpenWeatherGateway`] implements it against the One Call endpoint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::GatewayError;
use crate::types::{DayOutlook, ForecastSummary, WeatherCategory};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const ONE_CALL_PATH: &str = "/data/3.0/onecall";
const REQUEST_TIMEOUT_SECS: u64 = 10;
/// Days kept in the outlook after dropping today's entry.
const OUTLOOK_DAYS: usize = 5;

/// Fetches a forecast for a coordinate pair.
#[async_trait]
pub trait WeatherGateway: Send + Sync {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<ForecastSummary, GatewayError>;
}

/// One Call API client.
///
/// Returned summaries carry a coordinate label as `location_name`; callers
/// that know (or can resolve) a proper place name overwrite it.
#[derive(Debug, Clone)]
pub struct OpenWeatherGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherGateway {
    pub fn new(api_key: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Point the gateway at a different host (tests, proxies).
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl WeatherGateway for OpenWeatherGateway {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<ForecastSummary, GatewayError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GatewayError::InvalidRequest(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }

        let url = format!("{}{}", self.base_url, ONE_CALL_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(GatewayError::InvalidRequest(format!(
                "service returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(GatewayError::ServiceUnavailable(format!(
                "service returned {status}"
            )));
        }

        let payload: OneCallResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        summary_from_payload(payload, latitude, longitude)
    }
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: CurrentConditions,
    #[serde(default)]
    daily: Vec<DailyEntry>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temp: f64,
    #[serde(default)]
    weather: Vec<ConditionTag>,
}

#[derive(Debug, Deserialize)]
struct ConditionTag {
    main: String,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    dt: i64,
    temp: DailyTemps,
    #[serde(default)]
    weather: Vec<ConditionTag>,
}

#[derive(Debug, Deserialize)]
struct DailyTemps {
    day: f64,
    min: f64,
    max: f64,
}

fn summary_from_payload(
    payload: OneCallResponse,
    latitude: f64,
    longitude: f64,
) -> Result<ForecastSummary, GatewayError> {
    let today = payload
        .daily
        .first()
        .ok_or_else(|| GatewayError::MalformedResponse("empty daily forecast".into()))?;

    let category = payload
        .current
        .weather
        .first()
        .map(|tag| WeatherCategory::from_condition(&tag.main))
        .unwrap_or_default();

    // The feed's first daily entry is today; the outlook starts tomorrow.
    let outlook = payload
        .daily
        .iter()
        .skip(1)
        .take(OUTLOOK_DAYS)
        .map(|entry| DayOutlook {
            weekday: weekday_name(entry.dt),
            category: entry
                .weather
                .first()
                .map(|tag| WeatherCategory::from_condition(&tag.main))
                .unwrap_or_default(),
            temperature: entry.temp.day.round() as i32,
        })
        .collect();

    Ok(ForecastSummary {
        location_name: format!("{latitude:.2}, {longitude:.2}"),
        category,
        current_temp: payload.current.temp.round() as i32,
        day_temp: today.temp.day.round() as i32,
        min_temp: today.temp.min.round() as i32,
        max_temp: today.temp.max.round() as i32,
        captured_at: Utc::now(),
        outlook,
    })
}

fn weekday_name(epoch_secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_secs, 0)
        .map(|d| d.format("%A").to_string())
        .unwrap_or_default()
}
