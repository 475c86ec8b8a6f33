// tests/query_filter.rs
// Sport/league narrowing against a stored snapshot, including the distinct
// no-data outcome for filters that match nothing.

use async_trait::async_trait;
use chrono::NaiveDate;

use matchday_aggregator::pipeline::source::{
    FixtureSource, Lookahead, RawFixture, RawScore, ScoreSource, SourceOutcome,
};
use matchday_aggregator::schema::Sport;
use matchday_aggregator::service::{Aggregator, QueryError};

struct SnapshotScores;

#[async_trait]
impl ScoreSource for SnapshotScores {
    fn name(&self) -> &'static str {
        "snapshot-scores"
    }
    fn identity(&self) -> (Sport, &str) {
        (Sport::Mlb, "MLB")
    }
    async fn fetch(&self, _client: &reqwest::Client, date: NaiveDate) -> SourceOutcome<RawScore> {
        let mk = |sport, league: &str| RawScore {
            sport,
            league: league.into(),
            date: Some(date.to_string()),
            home_team: Some("H".into()),
            away_team: Some("A".into()),
            score: None,
        };
        SourceOutcome::Complete(vec![
            mk(Sport::Mlb, "MLB"),
            mk(Sport::Soccer, "Premier League"),
            mk(Sport::Nhl, "NHL"),
        ])
    }
}

struct PremierLeagueFixtures;

#[async_trait]
impl FixtureSource for PremierLeagueFixtures {
    fn name(&self) -> &'static str {
        "pl-fixtures"
    }
    async fn fetch(
        &self,
        _client: &reqwest::Client,
        window: Lookahead,
    ) -> SourceOutcome<RawFixture> {
        SourceOutcome::Complete(vec![RawFixture {
            sport: Sport::Soccer,
            league: "Premier League".into(),
            date: Some(window.start.to_string()),
            time: Some("15:00".into()),
            home_team: Some("Arsenal".into()),
            away_team: Some("Chelsea".into()),
            note: None,
        }])
    }
}

fn aggregator() -> Aggregator {
    Aggregator::with_sources(
        vec![Box::new(SnapshotScores)],
        vec![Box::new(PremierLeagueFixtures)],
        Vec::new(),
    )
}

fn day() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 5, 1)
}

#[tokio::test]
async fn every_returned_record_matches_the_resolved_sport() {
    let agg = aggregator();
    for token in ["mlb", "MLB", "Mlb"] {
        let events = agg.scores_for_sport(token, day()).await.unwrap();
        assert!(!events.is_empty());
        assert!(events
            .iter()
            .all(|e| e.sport.as_str().eq_ignore_ascii_case(token)));
    }
}

#[tokio::test]
async fn unmatched_sport_is_reported_as_no_data() {
    let agg = aggregator();
    // NBA exists in the enumeration but not in this snapshot.
    assert!(matches!(
        agg.scores_for_sport("nba", day()).await,
        Err(QueryError::NoData)
    ));
    // Unknown token falls through to verbatim comparison and matches nothing.
    assert!(matches!(
        agg.scores_for_sport("handball", day()).await,
        Err(QueryError::NoData)
    ));
}

#[tokio::test]
async fn league_substring_finds_premier_league() {
    let agg = aggregator();
    let fixtures = agg.soccer_fixtures_for_league("premier", 7).await.unwrap();
    assert_eq!(fixtures.len(), 1);
    assert_eq!(fixtures[0].league, "Premier League");
}

#[tokio::test]
async fn league_with_no_hits_is_no_data_not_empty_list() {
    let agg = aggregator();
    assert!(matches!(
        agg.soccer_fixtures_for_league("bundesliga", 7).await,
        Err(QueryError::NoData)
    ));
}
