use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::date_key::DateKey;
use super::rating::{RatingOptions, RatingOptionsPatch};
use super::resolver::{DailyChange, StateRecord};
use super::service::{ForecastService, ForecastSummary};
use super::tally::ElectoralVotes;
use crate::error::AppError;

/// Router builder exposing read-only forecast queries plus the session
/// rating options.
pub fn forecast_router(service: Arc<ForecastService>) -> Router {
    Router::new()
        .route("/api/v1/forecast/dates", get(dates_handler))
        .route(
            "/api/v1/forecast/options",
            get(options_handler).put(update_options_handler),
        )
        .route("/api/v1/forecast/:date", get(summary_handler))
        .route(
            "/api/v1/forecast/:date/electoral-votes",
            get(electoral_votes_handler),
        )
        .route("/api/v1/forecast/:date/states", get(states_handler))
        .route("/api/v1/forecast/:date/states/:state", get(state_handler))
        .route(
            "/api/v1/forecast/:date/states/:state/change",
            get(change_handler),
        )
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub(crate) struct DatesResponse {
    pub(crate) dates: Vec<DateKey>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatesResponse {
    pub(crate) date: DateKey,
    pub(crate) states: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ElectoralVotesResponse {
    pub(crate) date: DateKey,
    pub(crate) options: RatingOptions,
    #[serde(flatten)]
    pub(crate) totals: ElectoralVotes,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangeResponse {
    pub(crate) state: String,
    pub(crate) date: DateKey,
    #[serde(flatten)]
    pub(crate) change: DailyChange,
}

pub(crate) async fn dates_handler(
    State(service): State<Arc<ForecastService>>,
) -> Result<Json<DatesResponse>, AppError> {
    let dates = service.available_dates()?;
    Ok(Json(DatesResponse { dates }))
}

pub(crate) async fn options_handler(
    State(service): State<Arc<ForecastService>>,
) -> Json<RatingOptions> {
    Json(service.options())
}

pub(crate) async fn update_options_handler(
    State(service): State<Arc<ForecastService>>,
    Json(patch): Json<RatingOptionsPatch>,
) -> Json<RatingOptions> {
    Json(service.update_options(&patch))
}

pub(crate) async fn summary_handler(
    State(service): State<Arc<ForecastService>>,
    Path(date): Path<String>,
    Query(overrides): Query<RatingOptionsPatch>,
) -> Result<Json<ForecastSummary>, AppError> {
    let date = ForecastService::parse_date(&date)?;
    Ok(Json(service.summary(&date, &overrides)?))
}

pub(crate) async fn electoral_votes_handler(
    State(service): State<Arc<ForecastService>>,
    Path(date): Path<String>,
    Query(overrides): Query<RatingOptionsPatch>,
) -> Result<Json<ElectoralVotesResponse>, AppError> {
    let date = ForecastService::parse_date(&date)?;
    let totals = service.total_electoral_votes(&date, &overrides)?;
    Ok(Json(ElectoralVotesResponse {
        date,
        options: service.effective_options(&overrides),
        totals,
    }))
}

pub(crate) async fn states_handler(
    State(service): State<Arc<ForecastService>>,
    Path(date): Path<String>,
) -> Result<Json<StatesResponse>, AppError> {
    let date = ForecastService::parse_date(&date)?;
    let states = service.states_for_date(&date)?;
    Ok(Json(StatesResponse { date, states }))
}

pub(crate) async fn state_handler(
    State(service): State<Arc<ForecastService>>,
    Path((date, state)): Path<(String, String)>,
    Query(overrides): Query<RatingOptionsPatch>,
) -> Result<Json<StateRecord>, AppError> {
    let date = ForecastService::parse_date(&date)?;
    let record = service.state_record(&state, &date, &overrides)?;
    Ok(Json(StateRecord::clone(&record)))
}

pub(crate) async fn change_handler(
    State(service): State<Arc<ForecastService>>,
    Path((date, state)): Path<(String, String)>,
) -> Result<Json<ChangeResponse>, AppError> {
    let date = ForecastService::parse_date(&date)?;
    let change = service.daily_change(&state, &date)?;
    Ok(Json(ChangeResponse {
        state,
        date,
        change,
    }))
}
