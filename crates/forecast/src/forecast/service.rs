use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{info, warn};

use super::date_key::{DateKey, DateKeyError};
use super::loader::{ForecastData, ForecastSource, LoadError};
use super::rating::{RatingOptions, RatingOptionsPatch};
use super::resolver::{DailyChange, StateRecord, StateResolver};
use super::tally::{self, ElectoralVotes};
use crate::config::{Candidates, ConfigError, ElectionConfig};

/// Query facade handed to the presentation layer.
///
/// Queries fail with [`ForecastError::NotInitialized`] until a load has
/// completed. Rating options live here as session state; every query may
/// override them with a [`RatingOptionsPatch`] without touching the session.
pub struct ForecastService {
    config: ElectionConfig,
    resolver: RwLock<Option<Arc<StateResolver>>>,
    options: RwLock<RatingOptions>,
}

/// Aggregate probabilities from the latest snapshot on or before a date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NationalOutlook {
    pub as_of: DateKey,
    pub popular_vote: f64,
    pub electoral_college: f64,
}

/// Everything needed to render the forecast for one date.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastSummary {
    pub date: DateKey,
    pub options: RatingOptions,
    pub candidates: Candidates,
    pub electoral_votes: ElectoralVotes,
    /// Ticket ahead on electoral votes; absent on a tie.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading_candidate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national: Option<NationalOutlook>,
    pub states: Vec<StateRecord>,
}

/// Error raised by the forecast service.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("forecast data has not finished loading")]
    NotInitialized,
    #[error(transparent)]
    InvalidDate(#[from] DateKeyError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl ForecastService {
    pub fn new(config: ElectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            resolver: RwLock::new(None),
            options: RwLock::new(RatingOptions::default()),
        })
    }

    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }

    pub async fn load<S: ForecastSource>(&self, source: &S) -> Result<(), ForecastError> {
        let data = source.load().await?;
        self.install(data);
        Ok(())
    }

    /// Swaps in freshly loaded data. Cached records belong to the previous
    /// resolver and are dropped with it.
    pub fn install(&self, data: ForecastData) {
        let snapshots = data.series.len();
        if data.series.is_empty() {
            warn!("installed forecast data has no snapshots; every state falls back to no data");
        }
        let resolver = StateResolver::new(data.series, data.electoral_votes, self.config.clone());
        *self
            .resolver
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(resolver));
        info!(snapshots, "forecast data installed");
    }

    pub fn is_ready(&self) -> bool {
        self.resolver
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn options(&self) -> RatingOptions {
        *self.options.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies a partial update to the session options and returns the result.
    /// The next query re-derives with the new options.
    pub fn update_options(&self, patch: &RatingOptionsPatch) -> RatingOptions {
        let mut options = self.options.write().unwrap_or_else(PoisonError::into_inner);
        *options = patch.apply(*options);
        info!(?options, "rating options updated");
        *options
    }

    pub fn effective_options(&self, overrides: &RatingOptionsPatch) -> RatingOptions {
        overrides.apply(self.options())
    }

    pub fn available_dates(&self) -> Result<Vec<DateKey>, ForecastError> {
        Ok(self.resolver()?.series().dates_descending())
    }

    pub fn states_for_date(&self, date: &DateKey) -> Result<Vec<String>, ForecastError> {
        Ok(self.resolver()?.series().states_on(date))
    }

    pub fn state_record(
        &self,
        state: &str,
        date: &DateKey,
        overrides: &RatingOptionsPatch,
    ) -> Result<Arc<StateRecord>, ForecastError> {
        let options = self.effective_options(overrides);
        Ok(self.resolver()?.state_record(state, date, options))
    }

    pub fn daily_change(&self, state: &str, date: &DateKey) -> Result<DailyChange, ForecastError> {
        Ok(self.resolver()?.daily_change(state, date))
    }

    pub fn total_electoral_votes(
        &self,
        date: &DateKey,
        overrides: &RatingOptionsPatch,
    ) -> Result<ElectoralVotes, ForecastError> {
        let options = self.effective_options(overrides);
        let resolver = self.resolver()?;
        Ok(tally::total_electoral_votes(&resolver, date, options))
    }

    pub fn national_outlook(&self, date: &DateKey) -> Result<Option<NationalOutlook>, ForecastError> {
        let resolver = self.resolver()?;
        Ok(resolver
            .series()
            .latest_snapshot(date)
            .map(|(as_of, snapshot)| NationalOutlook {
                as_of,
                popular_vote: snapshot.popular_vote,
                electoral_college: snapshot.electoral_college,
            }))
    }

    /// Totals, national figures, and a record for every state with an
    /// electoral vote count (loaded table or tracked list).
    pub fn summary(
        &self,
        date: &DateKey,
        overrides: &RatingOptionsPatch,
    ) -> Result<ForecastSummary, ForecastError> {
        let options = self.effective_options(overrides);
        let resolver = self.resolver()?;

        let states = resolver
            .known_states()
            .into_iter()
            .map(|state| StateRecord::clone(&resolver.state_record(state, date, options)))
            .collect();

        let electoral_votes = tally::total_electoral_votes(&resolver, date, options);
        let leading_candidate = resolver
            .candidate(electoral_votes.leader())
            .map(str::to_string);

        Ok(ForecastSummary {
            date: *date,
            options,
            candidates: self.config.candidates.clone(),
            electoral_votes,
            leading_candidate,
            national: self.national_outlook(date)?,
            states,
        })
    }

    /// Resolves the `latest`/`today` aliases and any accepted date spelling.
    pub fn parse_date(raw: &str) -> Result<DateKey, ForecastError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "latest" | "today" => Ok(DateKey::today()?),
            _ => Ok(DateKey::parse(raw)?),
        }
    }

    fn resolver(&self) -> Result<Arc<StateResolver>, ForecastError> {
        self.resolver
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ForecastError::NotInitialized)
    }
}
