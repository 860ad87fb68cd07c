//! Forecast data core for Skycast.
//!
//! Watches connectivity, fetches forecasts from the weather service, keeps
//! the most recent current-location forecast in a durable single-slot cache,
//! and reconciles all of it into the state a forecast screen renders.

pub mod cache;
pub mod error;
pub mod gateway;
pub mod geocode;
pub mod monitor;
pub mod session;
pub mod types;

pub use cache::ForecastCache;
pub use error::{GatewayError, UnavailableReason};
pub use gateway::{OpenWeatherGateway, WeatherGateway};
pub use geocode::reverse_geocode;
pub use monitor::{
    ChannelSource, ConnectivitySource, NetworkEvents, NetworkMonitor, TcpProbeSource,
};
pub use session::{ForecastSession, ForecastViewState};
pub use types::{
    Coordinates, DayOutlook, ForecastSummary, NetworkStatus, OriginMode, RequestContext,
    WeatherCategory,
};
