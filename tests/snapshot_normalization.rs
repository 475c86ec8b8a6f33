// tests/snapshot_normalization.rs
// Canonical-schema guarantees over whole snapshots: totality of fields,
// JSON-safe numerics, and the captured-payload MLB scenario.

use async_trait::async_trait;
use chrono::NaiveDate;

use matchday_aggregator::pipeline::source::{
    PredictionSource, RawPrediction, RawScore, ScoreSource, SourceOutcome,
};
use matchday_aggregator::pipeline::sources::mlb;
use matchday_aggregator::pipeline::{normalize, run_predictions, run_scores};
use matchday_aggregator::schema::{Event, Sport};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn client() -> reqwest::Client {
    matchday_aggregator::fetch::build_client().expect("client builds offline")
}

#[test]
fn captured_mlb_preview_feed_yields_exactly_one_tbd_event() {
    // Shape captured from statsapi.mlb.com's schedule endpoint.
    let feed: serde_json::Value = serde_json::from_str(
        r#"{
            "dates": [{
                "date": "2024-05-01",
                "games": [{
                    "status": { "abstractGameState": "Preview" },
                    "gameDate": "2024-05-01T23:05:00Z",
                    "teams": {
                        "home": { "team": { "name": "Yankees" } },
                        "away": { "team": { "name": "Red Sox" } }
                    }
                }]
            }]
        }"#,
    )
    .unwrap();

    let raw = mlb::parse_scores(&feed);
    assert_eq!(raw.len(), 1);
    let event = normalize::event(raw.into_iter().next().unwrap(), day());
    assert_eq!(
        event,
        Event {
            sport: Sport::Mlb,
            league: "MLB".to_string(),
            date: "2024-05-01".to_string(),
            home_team: "Yankees".to_string(),
            away_team: "Red Sox".to_string(),
            score: "TBD".to_string(),
        }
    );
}

struct SparseScores;

#[async_trait]
impl ScoreSource for SparseScores {
    fn name(&self) -> &'static str {
        "sparse-scores"
    }
    fn identity(&self) -> (Sport, &str) {
        (Sport::Nhl, "NHL")
    }
    async fn fetch(&self, _client: &reqwest::Client, _date: NaiveDate) -> SourceOutcome<RawScore> {
        // The sparsest record an adapter can legally emit.
        SourceOutcome::Complete(vec![RawScore {
            sport: Sport::Nhl,
            league: "NHL".into(),
            date: None,
            home_team: None,
            away_team: None,
            score: None,
        }])
    }
}

#[tokio::test]
async fn every_canonical_field_is_present_even_for_sparse_upstreams() {
    let adapters: Vec<Box<dyn ScoreSource>> = vec![Box::new(SparseScores)];
    let events = run_scores(&adapters, &client(), day()).await;

    let value = serde_json::to_value(&events).unwrap();
    let record = &value.as_array().unwrap()[0];
    for field in ["sport", "league", "date", "home_team", "away_team", "score"] {
        assert!(
            record.get(field).is_some(),
            "field {field} must never be omitted"
        );
        assert!(!record[field].is_null(), "field {field} uses sentinels, not null");
    }
    assert_eq!(record["home_team"], "Unknown");
    assert_eq!(record["score"], "TBD");
    assert_eq!(record["date"], "2024-05-01");
}

struct NanPredictions;

#[async_trait]
impl PredictionSource for NanPredictions {
    fn name(&self) -> &'static str {
        "nan-predictions"
    }
    fn identity(&self) -> (Sport, &str) {
        (Sport::Soccer, "Various")
    }
    async fn fetch(&self, _client: &reqwest::Client) -> SourceOutcome<RawPrediction> {
        SourceOutcome::Complete(vec![RawPrediction {
            sport: Sport::Soccer,
            league: "Various".into(),
            home_team: Some("A".into()),
            away_team: Some("B".into()),
            home_win_prob: Some(f64::NAN),
            draw_prob: Some(f64::NEG_INFINITY),
            away_win_prob: Some(30.0),
            note: None,
            error: None,
        }])
    }
}

#[tokio::test]
async fn snapshots_never_contain_non_finite_numbers() {
    let adapters: Vec<Box<dyn PredictionSource>> = vec![Box::new(NanPredictions)];
    let predictions = run_predictions(&adapters, &client()).await;

    // serde_json would render NaN as null anyway; the pipeline nulls it
    // before serialization so in-memory consumers see the same thing.
    assert_eq!(predictions[0].home_win_prob, None);
    assert_eq!(predictions[0].draw_prob, None);
    assert_eq!(predictions[0].away_win_prob, Some(30.0));

    let json = serde_json::to_string(&predictions).unwrap();
    assert!(!json.contains("NaN"));
    assert!(json.contains("\"home_win_prob\":null"));
}
