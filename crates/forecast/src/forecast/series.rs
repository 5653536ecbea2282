use super::date_key::{DateKey, DateKeyError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Raw snapshot layout as published in `probabilities.json`.
#[derive(Debug, Clone, Deserialize)]
struct SnapshotJson {
    #[serde(rename = "PopularVote")]
    popular_vote: f64,
    #[serde(rename = "ElectoralCollege")]
    electoral_college: f64,
    #[serde(rename = "States", default)]
    states: BTreeMap<String, f64>,
}

/// One dated record of Democratic win probabilities (percent, 0-100).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub popular_vote: f64,
    pub electoral_college: f64,
    pub states: BTreeMap<String, f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    #[error("invalid probabilities JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid snapshot date '{key}': {source}")]
    Date {
        key: String,
        #[source]
        source: DateKeyError,
    },
    #[error("snapshot {date} lists '{key}' twice once separators are removed")]
    DuplicateDate { date: DateKey, key: String },
    #[error("probability {value} for {field} on {date} is outside 0-100")]
    OutOfRange {
        date: DateKey,
        field: String,
        value: f64,
    },
}

/// Date-indexed probability snapshots, immutable once built.
///
/// Alongside the snapshots a per-state list of reporting dates is kept sorted
/// ascending so "latest report on or before" is a binary search.
#[derive(Debug, Clone, Default)]
pub struct ProbabilitySeries {
    snapshots: BTreeMap<DateKey, Snapshot>,
    state_index: HashMap<String, Vec<DateKey>>,
}

impl ProbabilitySeries {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, SeriesError> {
        let raw: BTreeMap<String, SnapshotJson> = serde_json::from_slice(bytes)?;
        let mut snapshots = BTreeMap::new();

        for (key, snapshot) in raw {
            let date = DateKey::parse(&key).map_err(|source| SeriesError::Date {
                key: key.clone(),
                source,
            })?;
            let snapshot = Snapshot {
                popular_vote: snapshot.popular_vote,
                electoral_college: snapshot.electoral_college,
                states: snapshot.states,
            };
            validate_snapshot(date, &snapshot)?;
            if snapshots.insert(date, snapshot).is_some() {
                return Err(SeriesError::DuplicateDate { date, key });
            }
        }

        Ok(Self::from_snapshots(snapshots))
    }

    pub fn from_snapshots(snapshots: BTreeMap<DateKey, Snapshot>) -> Self {
        let mut state_index: HashMap<String, Vec<DateKey>> = HashMap::new();
        // BTreeMap iteration is ascending, so each per-state list comes out sorted.
        for (date, snapshot) in &snapshots {
            for state in snapshot.states.keys() {
                state_index.entry(state.clone()).or_default().push(*date);
            }
        }

        Self {
            snapshots,
            state_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Snapshot dates, newest first.
    pub fn dates_descending(&self) -> Vec<DateKey> {
        self.snapshots.keys().rev().copied().collect()
    }

    /// States reporting on exactly `date`; empty when no snapshot exists.
    pub fn states_on(&self, date: &DateKey) -> Vec<String> {
        self.snapshots
            .get(date)
            .map(|snapshot| snapshot.states.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `state` reported in any snapshot.
    pub fn has_state(&self, state: &str) -> bool {
        self.state_index.contains_key(state)
    }

    /// First and last snapshot dates.
    pub fn date_range(&self) -> Option<(DateKey, DateKey)> {
        let first = self.snapshots.keys().next()?;
        let last = self.snapshots.keys().next_back()?;
        Some((*first, *last))
    }

    /// Democratic probability reported for `state` on exactly `date`.
    pub fn probability_on(&self, state: &str, date: &DateKey) -> Option<f64> {
        self.snapshots.get(date)?.states.get(state).copied()
    }

    /// Latest date on or before `not_after` on which `state` reported.
    pub fn latest_date_for(&self, state: &str, not_after: &DateKey) -> Option<DateKey> {
        let dates = self.state_index.get(state)?;
        let upper = dates.partition_point(|date| date <= not_after);
        upper.checked_sub(1).map(|index| dates[index])
    }

    /// Latest snapshot of any kind on or before `not_after`.
    pub fn latest_snapshot(&self, not_after: &DateKey) -> Option<(DateKey, &Snapshot)> {
        self.snapshots
            .range(..=*not_after)
            .next_back()
            .map(|(date, snapshot)| (*date, snapshot))
    }
}

fn validate_snapshot(date: DateKey, snapshot: &Snapshot) -> Result<(), SeriesError> {
    let check = |field: &str, value: f64| {
        if (0.0..=100.0).contains(&value) {
            Ok(())
        } else {
            Err(SeriesError::OutOfRange {
                date,
                field: field.to_string(),
                value,
            })
        }
    };

    check("PopularVote", snapshot.popular_vote)?;
    check("ElectoralCollege", snapshot.electoral_college)?;
    for (state, value) in &snapshot.states {
        check(state, *value)?;
    }
    Ok(())
}
