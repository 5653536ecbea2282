use super::date_key::DateKey;
use super::rating::{Rating, RatingOptions};
use super::resolver::{Party, StateResolver};
use serde::Serialize;

/// Electoral vote totals for each party.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ElectoralVotes {
    pub democrat: u32,
    pub republican: u32,
}

impl ElectoralVotes {
    pub fn leader(&self) -> Party {
        match self.democrat.cmp(&self.republican) {
            std::cmp::Ordering::Greater => Party::Democrat,
            std::cmp::Ordering::Less => Party::Republican,
            std::cmp::Ordering::Equal => Party::None,
        }
    }
}

/// Sums base votes plus every tracked state not rated a toss-up.
///
/// The gate is the rating, not the margin: a toss-up with a non-zero margin
/// still contributes nothing. Non-toss-up states go to the margin-sign winner.
pub fn total_electoral_votes(
    resolver: &StateResolver,
    date: &DateKey,
    options: RatingOptions,
) -> ElectoralVotes {
    let ev_config = &resolver.config().ev_config;
    let mut totals = ElectoralVotes {
        democrat: ev_config.base_ev_dem,
        republican: ev_config.base_ev_rep,
    };

    for (state, votes) in &ev_config.ev_states {
        let record = resolver.state_record(state, date, options);
        if record.rating == Rating::TossUp {
            continue;
        }
        match record.winning_party() {
            Party::Democrat => totals.democrat = totals.democrat.saturating_add(*votes),
            Party::Republican => totals.republican = totals.republican.saturating_add(*votes),
            Party::None => {}
        }
    }

    totals
}
