use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Static election parameters injected into the forecast engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionConfig {
    pub rating_margins: RatingMargins,
    pub candidates: Candidates,
    pub ev_config: ElectoralVoteConfig,
    pub map_colors: MapColors,
}

/// Probability margins (Democratic minus Republican) required for each band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingMargins {
    pub solid: f64,
    pub likely: f64,
    pub lean: f64,
    pub tilt: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidates {
    pub democrat: String,
    pub republican: String,
}

/// Electoral votes from untracked states are folded into the base counts; the
/// tracked states are listed individually and awarded per forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectoralVoteConfig {
    pub base_ev_dem: u32,
    pub base_ev_rep: u32,
    pub ev_states: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapColors {
    pub solid_d: String,
    pub likely_d: String,
    pub lean_d: String,
    pub tilt_d: String,
    pub solid_r: String,
    pub likely_r: String,
    pub lean_r: String,
    pub tilt_r: String,
    pub tossup: String,
}

impl ElectionConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ConfigError::ElectionFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_slice(&bytes)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_slice(bytes).map_err(|source| ConfigError::ElectionJson { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rating_margins.validate()?;
        if self.total_electoral_votes().is_none() {
            return Err(ConfigError::ElectoralVoteOverflow);
        }
        Ok(())
    }

    /// Sum of the tracked states' votes; `None` on overflow.
    pub fn tracked_electoral_votes(&self) -> Option<u32> {
        self.ev_config
            .ev_states
            .values()
            .try_fold(0u32, |total, votes| total.checked_add(*votes))
    }

    /// Base votes for both parties plus every tracked state; `None` on overflow.
    pub fn total_electoral_votes(&self) -> Option<u32> {
        self.ev_config
            .base_ev_dem
            .checked_add(self.ev_config.base_ev_rep)?
            .checked_add(self.tracked_electoral_votes()?)
    }
}

impl Default for ElectionConfig {
    fn default() -> Self {
        let ev_states = [
            ("Nevada", 6),
            ("Arizona", 11),
            ("Georgia", 16),
            ("Florida", 30),
            ("North Carolina", 16),
            ("Pennsylvania", 19),
            ("Michigan", 15),
            ("Wisconsin", 10),
            ("Texas", 40),
            ("Minnesota", 10),
        ]
        .into_iter()
        .map(|(state, votes)| (state.to_string(), votes))
        .collect();

        Self {
            rating_margins: RatingMargins {
                solid: 60.0,
                likely: 40.0,
                lean: 20.0,
                tilt: 10.0,
            },
            candidates: Candidates {
                democrat: "Harris/Waltz".to_string(),
                republican: "Trump/Vance".to_string(),
            },
            ev_config: ElectoralVoteConfig {
                base_ev_dem: 216,
                base_ev_rep: 149,
                ev_states,
            },
            map_colors: MapColors {
                solid_d: "#0240f7".to_string(),
                likely_d: "#6679ff".to_string(),
                lean_d: "#99a8ff".to_string(),
                tilt_d: "#cdd8ff".to_string(),
                solid_r: "#f50202".to_string(),
                likely_r: "#ff808a".to_string(),
                lean_r: "#f8a3a7".to_string(),
                tilt_r: "#fcd2d4".to_string(),
                tossup: "#FFC300".to_string(),
            },
        }
    }
}

impl RatingMargins {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = [self.solid, self.likely, self.lean, self.tilt];
        if ordered.iter().any(|margin| !margin.is_finite() || *margin < 0.0) {
            return Err(ConfigError::NegativeMargin);
        }
        if ordered.windows(2).any(|pair| pair[0] < pair[1]) {
            return Err(ConfigError::NonMonotonicMargins {
                solid: self.solid,
                likely: self.likely,
                lean: self.lean,
                tilt: self.tilt,
            });
        }
        Ok(())
    }
}
