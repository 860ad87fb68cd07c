//! Forecast-specific error types.

use thiserror::Error;

/// Failures the weather gateway can report.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid forecast request: {0}")]
    InvalidRequest(String),

    #[error("Weather service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Malformed forecast response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => {
                "The forecast request was rejected. Check the configured API key."
            }
            Self::ServiceUnavailable(_) => {
                "The weather service could not be reached. Check your connection."
            }
            Self::MalformedResponse(_) => {
                "The weather service returned unusable data. Please try again."
            }
        }
    }

    /// Whether the failure is worth retrying on the next network flip.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return GatewayError::MalformedResponse(err.to_string());
        }
        if let Some(status) = err.status() {
            if status.is_client_error() {
                return GatewayError::InvalidRequest(err.to_string());
            }
        }
        GatewayError::ServiceUnavailable(err.to_string())
    }
}

/// Terminal reasons a forecast screen can have nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The remote fetch errored and no fallback applied.
    FetchFailed,
    /// Offline (or failed) with an empty cache slot.
    NoDataAvailable,
}

impl UnavailableReason {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::FetchFailed => "Could not load a forecast for this location. Please try again.",
            Self::NoDataAvailable => "You are offline and no saved forecast is available yet.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_user_messages() {
        assert!(GatewayError::InvalidRequest("bad key".into())
            .user_message()
            .contains("API key"));
        assert!(GatewayError::ServiceUnavailable("503".into())
            .user_message()
            .contains("connection"));
    }

    #[test]
    fn test_only_service_outages_are_transient() {
        assert!(GatewayError::ServiceUnavailable("down".into()).is_transient());
        assert!(!GatewayError::InvalidRequest("bad".into()).is_transient());
        assert!(!GatewayError::MalformedResponse("bad".into()).is_transient());
    }

    #[test]
    fn test_unavailable_reason_user_messages() {
        assert!(!UnavailableReason::FetchFailed.user_message().is_empty());
        assert!(UnavailableReason::NoDataAvailable
            .user_message()
            .contains("offline"));
    }
}
