use crate::config::ConfigError;
use crate::forecast::ForecastError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Forecast(ForecastError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Forecast(err) => write!(f, "forecast error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Forecast(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Forecast(ForecastError::InvalidDate(_)) => StatusCode::BAD_REQUEST,
            AppError::Forecast(ForecastError::NotInitialized) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Forecast(ForecastError::Load(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ForecastError> for AppError {
    fn from(value: ForecastError) -> Self {
        Self::Forecast(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::DateKeyError;

    #[test]
    fn forecast_errors_map_to_client_and_availability_statuses() {
        let invalid = AppError::from(ForecastError::InvalidDate(DateKeyError::InvalidFormat(
            "nope".to_string(),
        )));
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let pending = AppError::from(ForecastError::NotInitialized);
        assert_eq!(
            pending.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let config = AppError::from(ConfigError::InvalidPort);
        assert_eq!(
            config.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
