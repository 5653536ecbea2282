use super::date_key::DateKey;
use super::rating::{self, Rating, RatingOptions};
use super::series::ProbabilitySeries;
use crate::config::ElectionConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Democrat,
    Republican,
    None,
}

/// Win probabilities for one state as of a resolved snapshot date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateProbability {
    pub democrat: f64,
    pub republican: f64,
    /// Snapshot date the values come from; `None` when the state never reported.
    pub as_of: Option<DateKey>,
}

impl StateProbability {
    pub fn new(democrat: f64, as_of: Option<DateKey>) -> Self {
        Self {
            democrat,
            republican: 100.0 - democrat,
            as_of,
        }
    }

    /// Fallback for states without data: a certain Republican hold, not a tie.
    pub fn no_data() -> Self {
        Self::new(0.0, None)
    }

    pub fn margin(&self) -> f64 {
        self.democrat - self.republican
    }
}

/// Day-over-day movement in the Democratic probability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyChange {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advantage: Option<Party>,
}

impl DailyChange {
    fn from_diff(diff: f64) -> Self {
        if diff == 0.0 {
            Self {
                text: "None".to_string(),
                advantage: None,
            }
        } else if diff > 0.0 {
            Self {
                text: format!("D +{:.1}%", diff),
                advantage: Some(Party::Democrat),
            }
        } else {
            Self {
                text: format!("R +{:.1}%", -diff),
                advantage: Some(Party::Republican),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Everything the presentation layer needs about one state on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRecord {
    pub state: String,
    pub requested: DateKey,
    pub as_of: Option<DateKey>,
    pub electoral_votes: u32,
    pub probability: StateProbability,
    pub rating: Rating,
    pub daily_change: DailyChange,
    pub color: String,
}

impl StateRecord {
    pub fn margin(&self) -> f64 {
        self.probability.margin()
    }

    pub fn winning_party(&self) -> Party {
        winning_party(self)
    }
}

/// Winner by margin sign, independent of the rating band.
pub fn winning_party(record: &StateRecord) -> Party {
    let margin = record.margin();
    if margin > 0.0 {
        Party::Democrat
    } else if margin < 0.0 {
        Party::Republican
    } else {
        Party::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    state: String,
    date: DateKey,
    options: RatingOptions,
}

/// Resolves per-state forecasts from a loaded series and election config.
///
/// Inputs are immutable, so computed records are cached for the lifetime of
/// the resolver. Two callers racing on the same key may both compute; the
/// first insert wins and both observe equal records.
#[derive(Debug)]
pub struct StateResolver {
    series: ProbabilitySeries,
    electoral_votes: BTreeMap<String, u32>,
    config: ElectionConfig,
    cache: Mutex<HashMap<RecordKey, Arc<StateRecord>>>,
}

impl StateResolver {
    pub fn new(
        series: ProbabilitySeries,
        electoral_votes: BTreeMap<String, u32>,
        config: ElectionConfig,
    ) -> Self {
        Self {
            series,
            electoral_votes,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn series(&self) -> &ProbabilitySeries {
        &self.series
    }

    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }

    pub fn resolve_latest_date(&self, state: &str, not_after: &DateKey) -> Option<DateKey> {
        self.series.latest_date_for(state, not_after)
    }

    pub fn probability(&self, state: &str, date: &DateKey) -> StateProbability {
        let Some(latest) = self.resolve_latest_date(state, date) else {
            return StateProbability::no_data();
        };
        let democrat = self.series.probability_on(state, &latest).unwrap_or(0.0);
        StateProbability::new(democrat, Some(latest))
    }

    /// Change between the resolved snapshot and the calendar day right before
    /// it. Older reports are never used as the comparison point.
    pub fn daily_change(&self, state: &str, date: &DateKey) -> DailyChange {
        let Some(latest) = self.resolve_latest_date(state, date) else {
            return DailyChange::default();
        };
        let Some(previous_day) = latest.add_days(-1) else {
            return DailyChange::default();
        };

        match (
            self.series.probability_on(state, &latest),
            self.series.probability_on(state, &previous_day),
        ) {
            (Some(current), Some(previous)) => DailyChange::from_diff(current - previous),
            _ => DailyChange::default(),
        }
    }

    /// Electoral votes for a state: the loaded vote table first, then the
    /// configured tracked states, otherwise zero.
    pub fn electoral_votes(&self, state: &str) -> u32 {
        self.electoral_votes
            .get(state)
            .or_else(|| self.config.ev_config.ev_states.get(state))
            .copied()
            .unwrap_or(0)
    }

    /// States with an electoral vote count from either the vote table or the
    /// tracked list, sorted by name.
    pub fn known_states(&self) -> BTreeSet<&str> {
        self.electoral_votes
            .keys()
            .chain(self.config.ev_config.ev_states.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn candidate(&self, party: Party) -> Option<&str> {
        match party {
            Party::Democrat => Some(self.config.candidates.democrat.as_str()),
            Party::Republican => Some(self.config.candidates.republican.as_str()),
            Party::None => None,
        }
    }

    /// Derives the record for a state on a date. Only known states requested
    /// within the loaded date range are cached; anything else is recomputed on
    /// every call so client input cannot grow the cache.
    pub fn state_record(
        &self,
        state: &str,
        date: &DateKey,
        options: RatingOptions,
    ) -> Arc<StateRecord> {
        if !self.is_cacheable(state, date) {
            return Arc::new(self.compute_record(state, date, options));
        }

        let key = RecordKey {
            state: state.to_string(),
            date: *date,
            options,
        };

        if let Some(record) = self.lock_cache().get(&key) {
            return Arc::clone(record);
        }

        let record = Arc::new(self.compute_record(state, date, options));
        debug!(state, date = %date, rating = record.rating.label(), "resolved state record");

        let mut cache = self.lock_cache();
        Arc::clone(cache.entry(key).or_insert(record))
    }

    pub fn cached_records(&self) -> usize {
        self.lock_cache().len()
    }

    fn is_cacheable(&self, state: &str, date: &DateKey) -> bool {
        let known = self.electoral_votes.contains_key(state)
            || self.config.ev_config.ev_states.contains_key(state)
            || self.series.has_state(state);
        let in_range = self
            .series
            .date_range()
            .is_some_and(|(first, last)| (first..=last).contains(date));
        known && in_range
    }

    fn compute_record(&self, state: &str, date: &DateKey, options: RatingOptions) -> StateRecord {
        let probability = self.probability(state, date);
        let margin = probability.margin();
        let rating = rating::classify(margin, &self.config.rating_margins, options);
        let color = rating::color(rating, margin, &self.config.map_colors, options).to_string();

        StateRecord {
            state: state.to_string(),
            requested: *date,
            as_of: probability.as_of,
            electoral_votes: self.electoral_votes(state),
            probability,
            rating,
            daily_change: self.daily_change(state, date),
            color,
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<RecordKey, Arc<StateRecord>>> {
        // Records are pure functions of immutable inputs, so a poisoned map is still valid.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
