// tests/pipeline_isolation.rs
// Per-source failure isolation: a dead upstream degrades to fallback records
// or a sentinel, and sibling adapters contribute untouched.

use async_trait::async_trait;
use chrono::NaiveDate;

use matchday_aggregator::pipeline::source::{
    FixtureSource, Lookahead, RawFixture, RawScore, ScoreSource, SourceError, SourceOutcome,
};
use matchday_aggregator::pipeline::{run_fixtures, run_scores};
use matchday_aggregator::schema::{Sport, TBD, UNKNOWN};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn client() -> reqwest::Client {
    matchday_aggregator::fetch::build_client().expect("client builds offline")
}

struct DeadSoccer;

#[async_trait]
impl ScoreSource for DeadSoccer {
    fn name(&self) -> &'static str {
        "dead-soccer"
    }
    fn identity(&self) -> (Sport, &str) {
        (Sport::Soccer, "Soccer")
    }
    async fn fetch(&self, _client: &reqwest::Client, _date: NaiveDate) -> SourceOutcome<RawScore> {
        SourceOutcome::Failed(SourceError::Unavailable("connection refused".into()))
    }
}

struct HealthyMlb;

#[async_trait]
impl ScoreSource for HealthyMlb {
    fn name(&self) -> &'static str {
        "healthy-mlb"
    }
    fn identity(&self) -> (Sport, &str) {
        (Sport::Mlb, "MLB")
    }
    async fn fetch(&self, _client: &reqwest::Client, date: NaiveDate) -> SourceOutcome<RawScore> {
        SourceOutcome::Complete(vec![RawScore {
            sport: Sport::Mlb,
            league: "MLB".into(),
            date: Some(date.to_string()),
            home_team: Some("Yankees".into()),
            away_team: Some("Red Sox".into()),
            score: None,
        }])
    }
}

struct OffSeasonNhl;

#[async_trait]
impl ScoreSource for OffSeasonNhl {
    fn name(&self) -> &'static str {
        "off-season-nhl"
    }
    fn identity(&self) -> (Sport, &str) {
        (Sport::Nhl, "NHL")
    }
    async fn fetch(&self, _client: &reqwest::Client, _date: NaiveDate) -> SourceOutcome<RawScore> {
        SourceOutcome::Failed(SourceError::NoDataForSeason)
    }
}

#[tokio::test]
async fn dead_source_does_not_abort_siblings() {
    let adapters: Vec<Box<dyn ScoreSource>> =
        vec![Box::new(DeadSoccer), Box::new(HealthyMlb), Box::new(OffSeasonNhl)];
    let events = run_scores(&adapters, &client(), day()).await;

    // Soccer vanished (no fallback), MLB contributed, NHL left a sentinel.
    assert!(events.iter().all(|e| e.sport != Sport::Soccer));
    let mlb: Vec<_> = events.iter().filter(|e| e.sport == Sport::Mlb).collect();
    assert_eq!(mlb.len(), 1);
    assert_eq!(mlb[0].home_team, "Yankees");
    assert_eq!(mlb[0].score, TBD);

    let nhl: Vec<_> = events.iter().filter(|e| e.sport == Sport::Nhl).collect();
    assert_eq!(nhl.len(), 1);
    assert_eq!(nhl[0].score, "No games scheduled");
    assert_eq!(nhl[0].home_team, UNKNOWN);
}

struct FallbackScores;

#[async_trait]
impl ScoreSource for FallbackScores {
    fn name(&self) -> &'static str {
        "fallback-scores"
    }
    fn identity(&self) -> (Sport, &str) {
        (Sport::Nhl, "NHL")
    }
    async fn fetch(&self, _client: &reqwest::Client, _date: NaiveDate) -> SourceOutcome<RawScore> {
        SourceOutcome::Failed(SourceError::Unavailable("tls handshake".into()))
    }
    fn fallback(&self, date: NaiveDate) -> Vec<RawScore> {
        vec![RawScore {
            sport: Sport::Nhl,
            league: "NHL".into(),
            date: Some(date.to_string()),
            home_team: None,
            away_team: None,
            score: Some("Unavailable".into()),
        }]
    }
}

#[tokio::test]
async fn failed_source_with_fallback_stays_visible() {
    let adapters: Vec<Box<dyn ScoreSource>> = vec![Box::new(FallbackScores)];
    let events = run_scores(&adapters, &client(), day()).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].score, "Unavailable");
    assert_eq!(events[0].home_team, UNKNOWN);
}

struct DeadFixtures(Sport);

#[async_trait]
impl FixtureSource for DeadFixtures {
    fn name(&self) -> &'static str {
        "dead-fixtures"
    }
    async fn fetch(
        &self,
        _client: &reqwest::Client,
        _window: Lookahead,
    ) -> SourceOutcome<RawFixture> {
        SourceOutcome::Failed(SourceError::Unavailable("504".into()))
    }
    fn fallback(&self, window: Lookahead) -> Vec<RawFixture> {
        match self.0 {
            Sport::Nba => matchday_aggregator::pipeline::fallback::nba_fixtures(window),
            _ => Vec::new(),
        }
    }
}

#[tokio::test]
async fn fixture_fallback_records_are_tagged() {
    let adapters: Vec<Box<dyn FixtureSource>> = vec![Box::new(DeadFixtures(Sport::Nba))];
    let window = Lookahead::starting(day(), 7);
    let fixtures = run_fixtures(&adapters, &client(), window).await;

    assert_eq!(fixtures.len(), 3);
    assert!(fixtures.iter().all(|f| f.sport == Sport::Nba));
    assert!(fixtures.iter().all(|f| f.note.is_some()));
    // fallback dates sit inside the lookahead window
    for f in &fixtures {
        let d = NaiveDate::parse_from_str(&f.date, "%Y-%m-%d").unwrap();
        assert!(window.contains(d));
    }
}

#[tokio::test]
async fn empty_fixtures_run_yields_tagged_sample_snapshot() {
    let adapters: Vec<Box<dyn FixtureSource>> = vec![Box::new(DeadFixtures(Sport::Nfl))];
    // NFL branch of the mock has no fallback either, so the run ends empty.
    let fixtures = run_fixtures(&adapters, &client(), Lookahead::starting(day(), 1)).await;

    assert_eq!(fixtures.len(), 2);
    assert!(fixtures.iter().all(|f| f.note.is_some()));
    let sports: Vec<_> = fixtures.iter().map(|f| f.sport).collect();
    assert!(sports.contains(&Sport::Soccer));
    assert!(sports.contains(&Sport::Mlb));
}

#[tokio::test]
async fn real_soccer_adapter_exhausts_retries_without_raising() {
    use std::sync::Arc;
    use std::time::Duration;

    use matchday_aggregator::config::SoccerLeague;
    use matchday_aggregator::pipeline::pace::{InstantPacer, RateLimiter, RetryPolicy};
    use matchday_aggregator::pipeline::sources::soccer_scores::SoccerScores;

    // Nothing listens on port 1; every league fails every attempt.
    let league = |name: &str| SoccerLeague {
        name: name.into(),
        scores_url: format!("http://127.0.0.1:1/{name}"),
        fixtures_url: format!("http://127.0.0.1:1/{name}"),
    };
    let pacer = Arc::new(InstantPacer::new());
    let soccer = SoccerScores::new(
        vec![league("Premier League"), league("La Liga")],
        RetryPolicy::soccer_scores(pacer.clone()),
        RateLimiter::new(Duration::from_secs(2), pacer.clone()),
    );

    let adapters: Vec<Box<dyn ScoreSource>> = vec![Box::new(soccer), Box::new(HealthyMlb)];
    let events = run_scores(&adapters, &client(), day()).await;

    // Soccer contributes nothing, MLB is untouched.
    assert!(events.iter().all(|e| e.sport != Sport::Soccer));
    assert_eq!(events.iter().filter(|e| e.sport == Sport::Mlb).count(), 1);

    // Two failed attempts back off per league (5 s, then 10 s); no courtesy
    // delay ever fires because no league succeeded.
    let pauses = pacer.pauses.lock().unwrap().clone();
    assert_eq!(
        pauses,
        vec![
            Duration::from_secs(5),
            Duration::from_secs(10),
            Duration::from_secs(5),
            Duration::from_secs(10),
        ]
    );
}

#[tokio::test]
async fn snapshot_is_sorted_by_sport_league_date() {
    struct TwoSports;
    #[async_trait]
    impl ScoreSource for TwoSports {
        fn name(&self) -> &'static str {
            "two-sports"
        }
        fn identity(&self) -> (Sport, &str) {
            (Sport::Soccer, "Soccer")
        }
        async fn fetch(
            &self,
            _client: &reqwest::Client,
            _date: NaiveDate,
        ) -> SourceOutcome<RawScore> {
            let mk = |sport, league: &str, date: &str| RawScore {
                sport,
                league: league.into(),
                date: Some(date.into()),
                home_team: Some("H".into()),
                away_team: Some("A".into()),
                score: None,
            };
            SourceOutcome::Complete(vec![
                mk(Sport::Soccer, "La Liga", "2024-05-01"),
                mk(Sport::Mlb, "MLB", "2024-05-02"),
                mk(Sport::Soccer, "Bundesliga", "2024-05-01"),
                mk(Sport::Mlb, "MLB", "2024-05-01"),
            ])
        }
    }

    let adapters: Vec<Box<dyn ScoreSource>> = vec![Box::new(TwoSports)];
    let events = run_scores(&adapters, &client(), day()).await;
    let keys: Vec<_> = events
        .iter()
        .map(|e| (e.sport.as_str(), e.league.as_str(), e.date.as_str()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}
