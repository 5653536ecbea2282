//! Forecast derivation: dated probability snapshots in, per-state ratings,
//! colors, daily changes, and electoral vote totals out.

mod date_key;
mod loader;
mod rating;
mod resolver;
mod router;
mod series;
mod service;
mod tally;

pub use date_key::{DateKey, DateKeyError};
pub use loader::{
    ForecastData, ForecastSource, JsonDirectorySource, LoadError, ELECTORAL_VOTES_FILE,
    PROBABILITIES_FILE,
};
pub use rating::{classify, color, Rating, RatingOptions, RatingOptionsPatch};
pub use resolver::{
    winning_party, DailyChange, Party, StateProbability, StateRecord, StateResolver,
};
pub use router::forecast_router;
pub use series::{ProbabilitySeries, SeriesError, Snapshot};
pub use service::{ForecastError, ForecastService, ForecastSummary, NationalOutlook};
pub use tally::{total_electoral_votes, ElectoralVotes};

#[cfg(test)]
mod tests;
