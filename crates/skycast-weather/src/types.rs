use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weather buckets the app distinguishes, mapped from the condition group
/// names the forecast feed reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Clear,
    Rain,
    Clouds,
    Snow,
    Fog,
    #[default]
    Unknown,
}

impl WeatherCategory {
    /// Map a condition group name from the forecast feed.
    pub fn from_condition(name: &str) -> Self {
        match name {
            "Clear" => Self::Clear,
            "Rain" => Self::Rain,
            "Clouds" => Self::Clouds,
            "Snow" => Self::Snow,
            "Fog" => Self::Fog,
            _ => Self::Unknown,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Rain => "Rain",
            Self::Clouds => "Clouds",
            Self::Snow => "Snow",
            Self::Fog => "Fog",
            Self::Unknown => "Unknown",
        }
    }
}

/// One entry of the five-day outlook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOutlook {
    pub weekday: String,
    pub category: WeatherCategory,
    pub temperature: i32,
}

/// The unit persisted and displayed: one forecast for one place.
///
/// Temperatures are whole degrees Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub location_name: String,
    pub category: WeatherCategory,
    pub current_temp: i32,
    pub day_temp: i32,
    pub min_temp: i32,
    pub max_temp: i32,
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub outlook: Vec<DayOutlook>,
}

/// Transport reachability as the monitor reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Unknown,
    Online,
    Offline,
}

/// Why a forecast screen was opened.
///
/// Gates cache write-through: only the user's own location feeds the
/// offline slot, since favorite and map views show arbitrary places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginMode {
    CurrentLocation,
    SavedFavorite,
    MapSelection,
}

impl OriginMode {
    /// True if a successful fetch in this mode updates the offline slot.
    pub fn writes_through(&self) -> bool {
        matches!(self, OriginMode::CurrentLocation)
    }
}

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Fallback display when no place name can be resolved.
    pub fn label(&self) -> String {
        format!("{:.2}, {:.2}", self.latitude, self.longitude)
    }
}

/// Everything a screen activation needs to ask for a forecast.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub coordinates: Coordinates,
    pub origin: OriginMode,
    /// Display name carried in by favorite/map openings. When absent, the
    /// name is resolved by reverse geocoding after a successful fetch.
    pub place_name: Option<String>,
}

impl RequestContext {
    pub fn new(coordinates: Coordinates, origin: OriginMode) -> Self {
        Self {
            coordinates,
            origin,
            place_name: None,
        }
    }

    pub fn with_place_name(mut self, name: impl Into<String>) -> Self {
        self.place_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_clear() {
        assert_eq!(WeatherCategory::from_condition("Clear"), WeatherCategory::Clear);
    }

    #[test]
    fn test_condition_rain() {
        assert_eq!(WeatherCategory::from_condition("Rain"), WeatherCategory::Rain);
    }

    #[test]
    fn test_condition_clouds() {
        assert_eq!(WeatherCategory::from_condition("Clouds"), WeatherCategory::Clouds);
    }

    #[test]
    fn test_condition_snow() {
        assert_eq!(WeatherCategory::from_condition("Snow"), WeatherCategory::Snow);
    }

    #[test]
    fn test_condition_fog() {
        assert_eq!(WeatherCategory::from_condition("Fog"), WeatherCategory::Fog);
    }

    #[test]
    fn test_unrecognized_condition_is_unknown() {
        assert_eq!(
            WeatherCategory::from_condition("Thunderstorm"),
            WeatherCategory::Unknown
        );
        assert_eq!(WeatherCategory::from_condition(""), WeatherCategory::Unknown);
    }

    #[test]
    fn test_category_description() {
        assert_eq!(WeatherCategory::Clear.description(), "Clear");
        assert_eq!(WeatherCategory::Unknown.description(), "Unknown");
    }

    #[test]
    fn test_only_current_location_writes_through() {
        assert!(OriginMode::CurrentLocation.writes_through());
        assert!(!OriginMode::SavedFavorite.writes_through());
        assert!(!OriginMode::MapSelection.writes_through());
    }

    #[test]
    fn test_coordinate_label() {
        let coords = Coordinates::new(51.5074, -0.1278);
        assert_eq!(coords.label(), "51.51, -0.13");
    }

    #[test]
    fn test_request_context_place_name() {
        let ctx = RequestContext::new(Coordinates::new(0.0, 0.0), OriginMode::SavedFavorite)
            .with_place_name("London");
        assert_eq!(ctx.place_name.as_deref(), Some("London"));
    }
}
