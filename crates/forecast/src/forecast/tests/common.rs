use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::config::ElectionConfig;
use crate::forecast::{DateKey, ForecastData, ForecastService};

pub(super) const ELECTORAL_VOTES: &str = r#"{ "Nevada": 6, "Ohio": 17 }"#;

/// Nevada drifts from 50 to 52 between consecutive days; Georgia never reports.
pub(super) const PROBABILITIES: &str = r#"{
    "20241102": {
        "PopularVote": 58,
        "ElectoralCollege": 52,
        "States": { "Nevada": 50, "Arizona": 44, "Pennsylvania": 70, "Texas": 20, "Ohio": 31 }
    },
    "20241103": {
        "PopularVote": 59,
        "ElectoralCollege": 54,
        "States": { "Nevada": 52, "Arizona": 45, "Pennsylvania": 70, "Texas": 20, "Ohio": 30 }
    }
}"#;

pub(super) fn key(raw: &str) -> DateKey {
    DateKey::parse(raw).expect("valid date key")
}

pub(super) fn forecast_data() -> ForecastData {
    ForecastData::from_json_slices(ELECTORAL_VOTES.as_bytes(), PROBABILITIES.as_bytes())
        .expect("fixture parses")
}

pub(super) fn pending_service() -> Arc<ForecastService> {
    Arc::new(ForecastService::new(ElectionConfig::default()).expect("default config is valid"))
}

pub(super) async fn loaded_service() -> Arc<ForecastService> {
    let service = pending_service();
    service
        .load(&forecast_data())
        .await
        .expect("in-memory load succeeds");
    service
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
