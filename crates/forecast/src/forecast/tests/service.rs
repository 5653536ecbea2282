use super::common::*;

use crate::forecast::{
    DateKey, ForecastError, ForecastService, Party, Rating, RatingOptions, RatingOptionsPatch,
};

#[tokio::test]
async fn queries_fail_until_data_is_loaded() {
    let service = pending_service();
    assert!(!service.is_ready());
    assert!(matches!(
        service.available_dates(),
        Err(ForecastError::NotInitialized)
    ));
    assert!(matches!(
        service.total_electoral_votes(&key("20241103"), &RatingOptionsPatch::default()),
        Err(ForecastError::NotInitialized)
    ));

    service.load(&forecast_data()).await.expect("load succeeds");
    assert!(service.is_ready());
    assert_eq!(
        service.available_dates().expect("dates available"),
        vec![key("20241103"), key("20241102")]
    );
}

#[tokio::test]
async fn totals_skip_tossups_and_count_unreported_states_for_republicans() {
    let service = loaded_service().await;
    let totals = service
        .total_electoral_votes(&key("20241103"), &RatingOptionsPatch::default())
        .expect("totals");

    // Nevada is a toss-up; Pennsylvania is the only Democratic pickup.
    assert_eq!(totals.democrat, 216 + 19);
    assert_eq!(totals.republican, 149 + 173 - 6 - 19);
    assert_eq!(totals.leader(), Party::Republican);
}

#[tokio::test]
async fn per_query_overrides_leave_session_options_alone() {
    let service = loaded_service().await;
    let overrides = RatingOptionsPatch {
        use_tossup: Some(false),
        ..RatingOptionsPatch::default()
    };

    let totals = service
        .total_electoral_votes(&key("20241103"), &overrides)
        .expect("totals");
    assert_eq!(totals.democrat, 216 + 19 + 6);

    let nevada = service
        .state_record("Nevada", &key("20241103"), &overrides)
        .expect("record");
    assert_eq!(nevada.rating, Rating::TiltD);
    assert_eq!(service.options(), RatingOptions::default());
}

#[tokio::test]
async fn session_option_updates_rederive_ratings() {
    let service = loaded_service().await;
    let date = key("20241103");
    let none = RatingOptionsPatch::default();

    let before = service.state_record("Arizona", &date, &none).expect("record");
    assert_eq!(before.rating, Rating::TiltR);

    let patch: RatingOptionsPatch =
        serde_json::from_str(r#"{ "tilts": false }"#).expect("patch parses");
    let updated = service.update_options(&patch);
    assert!(!updated.use_tilt);
    assert!(updated.use_tossup);

    let after = service.state_record("Arizona", &date, &none).expect("record");
    assert_eq!(after.rating, Rating::TossUp);
    assert_eq!(after.color, service.config().map_colors.tossup);

    let totals = service.total_electoral_votes(&date, &none).expect("totals");
    assert_eq!(totals.republican, 149 + 173 - 6 - 19 - 11);
}

#[tokio::test]
async fn unreported_states_resolve_to_solid_republican_without_change() {
    let service = loaded_service().await;
    let georgia = service
        .state_record("Georgia", &key("20241105"), &RatingOptionsPatch::default())
        .expect("record");

    assert_eq!(georgia.probability.democrat, 0.0);
    assert_eq!(georgia.probability.republican, 100.0);
    assert_eq!(georgia.as_of, None);
    assert_eq!(georgia.electoral_votes, 16);
    assert_eq!(georgia.rating, Rating::SolidR);
    assert_eq!(georgia.color, service.config().map_colors.solid_r);
    assert!(georgia.daily_change.is_empty());
}

#[tokio::test]
async fn later_requests_carry_the_last_report_forward() {
    let service = loaded_service().await;
    let requested = key("20241105");

    let nevada = service
        .state_record("Nevada", &requested, &RatingOptionsPatch::default())
        .expect("record");
    assert_eq!(nevada.requested, requested);
    assert_eq!(nevada.as_of, Some(key("20241103")));
    assert_eq!(nevada.probability.democrat, 52.0);

    let change = service.daily_change("Nevada", &requested).expect("change");
    assert_eq!(change.text, "D +2.0%");
    let change = service.daily_change("Ohio", &requested).expect("change");
    assert_eq!(change.text, "R +1.0%");
    assert_eq!(change.advantage, Some(Party::Republican));
}

#[tokio::test]
async fn summary_lists_every_state_with_votes() {
    let service = loaded_service().await;
    let summary = service
        .summary(&key("20241105"), &RatingOptionsPatch::default())
        .expect("summary");

    let names: Vec<&str> = summary.states.iter().map(|s| s.state.as_str()).collect();
    assert_eq!(names.len(), 11);
    assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(names.contains(&"Ohio"));

    let national = summary.national.expect("national outlook");
    assert_eq!(national.as_of, key("20241103"));
    assert_eq!(national.popular_vote, 59.0);
    assert_eq!(summary.candidates.democrat, "Harris/Waltz");
    assert_eq!(summary.electoral_votes.democrat, 235);
    assert_eq!(summary.leading_candidate.as_deref(), Some("Trump/Vance"));

    let early = service
        .summary(&key("20241001"), &RatingOptionsPatch::default())
        .expect("summary");
    assert!(early.national.is_none());
}

#[tokio::test]
async fn states_for_date_only_lists_exact_snapshots() {
    let service = loaded_service().await;
    let states = service.states_for_date(&key("20241103")).expect("states");
    assert_eq!(
        states,
        vec!["Arizona", "Nevada", "Ohio", "Pennsylvania", "Texas"]
    );
    assert!(service
        .states_for_date(&key("20241104"))
        .expect("states")
        .is_empty());
}

#[test]
fn parse_date_accepts_aliases_and_separators() {
    let today = DateKey::today().expect("clock within range");
    let parsed = ForecastService::parse_date("latest").expect("alias");
    // Midnight may pass between the two reads.
    assert!(parsed == today || parsed == today.add_days(1).expect("in range"));
    assert_eq!(
        ForecastService::parse_date("2024-11-03").expect("dashed"),
        key("20241103")
    );
    assert!(matches!(
        ForecastService::parse_date("2024-13-40"),
        Err(ForecastError::InvalidDate(_))
    ));
}
