// src/pipeline/sources/mlb.rs
// MLB statsapi schedule feed: one request per day, game state filtered via
// `status.abstractGameState`.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::pipeline::pace::RateLimiter;
use crate::pipeline::source::{
    get_json, FixtureSource, Lookahead, RawFixture, RawScore, ScoreSource, SourceOutcome,
};
use crate::pipeline::sources::iso_time_of_day;
use crate::schema::Sport;

pub struct MlbScores {
    url_template: String,
    limiter: RateLimiter,
}

impl MlbScores {
    pub fn new(url_template: String, limiter: RateLimiter) -> Self {
        Self {
            url_template,
            limiter,
        }
    }
}

#[async_trait]
impl ScoreSource for MlbScores {
    fn name(&self) -> &'static str {
        "mlb-statsapi"
    }

    fn identity(&self) -> (Sport, &str) {
        (Sport::Mlb, "MLB")
    }

    async fn fetch(&self, client: &reqwest::Client, date: NaiveDate) -> SourceOutcome<RawScore> {
        let url = crate::config::render_dated(&self.url_template, date);
        let out = match get_json(client, &url).await {
            Ok(doc) => SourceOutcome::Complete(parse_scores(&doc)),
            Err(e) => SourceOutcome::Failed(e),
        };
        self.limiter.courtesy().await;
        out
    }
}

/// Scores accept all of Preview/Live/Final; a game nobody has scored in yet
/// shows "TBD".
pub fn parse_scores(doc: &Value) -> Vec<RawScore> {
    let mut out = Vec::new();
    for game_date in arr(doc.pointer("/dates")) {
        let date = game_date.pointer("/date").and_then(Value::as_str);
        for game in arr(game_date.pointer("/games")) {
            let state = game
                .pointer("/status/abstractGameState")
                .and_then(Value::as_str)
                .unwrap_or("");
            if !matches!(state, "Preview" | "Live" | "Final") {
                continue;
            }

            let home_score = game
                .pointer("/teams/home/score")
                .and_then(Value::as_i64)
                .unwrap_or(0);
            let away_score = game
                .pointer("/teams/away/score")
                .and_then(Value::as_i64)
                .unwrap_or(0);
            let score = if home_score != 0 || away_score != 0 {
                Some(format!("{home_score}-{away_score}"))
            } else {
                None
            };

            out.push(RawScore {
                sport: Sport::Mlb,
                league: "MLB".to_string(),
                date: date.map(str::to_string),
                home_team: team_name(game, "home"),
                away_team: team_name(game, "away"),
                score,
            });
        }
    }
    out
}

pub struct MlbFixtures {
    url_template: String,
    limiter: RateLimiter,
}

impl MlbFixtures {
    pub fn new(url_template: String, limiter: RateLimiter) -> Self {
        Self {
            url_template,
            limiter,
        }
    }
}

#[async_trait]
impl FixtureSource for MlbFixtures {
    fn name(&self) -> &'static str {
        "mlb-statsapi"
    }

    async fn fetch(
        &self,
        client: &reqwest::Client,
        window: Lookahead,
    ) -> SourceOutcome<RawFixture> {
        let mut records = Vec::new();
        for date in window.request_dates() {
            let url = crate::config::render_dated(&self.url_template, date);
            match get_json(client, &url).await {
                Ok(doc) => records.append(&mut parse_fixtures(&doc, date)),
                // A single bad day aborts the source; days already collected
                // stay in the snapshot.
                Err(e) => {
                    let out = if records.is_empty() {
                        SourceOutcome::Failed(e)
                    } else {
                        SourceOutcome::Partial { records, cause: e }
                    };
                    return out;
                }
            }
            self.limiter.courtesy().await;
        }
        SourceOutcome::Complete(records)
    }
}

/// Fixtures keep Preview games only; `time` is sliced from the ISO gameDate.
pub fn parse_fixtures(doc: &Value, date: NaiveDate) -> Vec<RawFixture> {
    let mut out = Vec::new();
    for game_date in arr(doc.pointer("/dates")) {
        for game in arr(game_date.pointer("/games")) {
            let state = game
                .pointer("/status/abstractGameState")
                .and_then(Value::as_str)
                .unwrap_or("");
            if state != "Preview" {
                continue;
            }

            out.push(RawFixture {
                sport: Sport::Mlb,
                league: "MLB".to_string(),
                date: Some(date.to_string()),
                time: game
                    .pointer("/gameDate")
                    .and_then(Value::as_str)
                    .and_then(iso_time_of_day),
                home_team: team_name(game, "home"),
                away_team: team_name(game, "away"),
                note: None,
            });
        }
    }
    out
}

fn team_name(game: &Value, side: &str) -> Option<String> {
    game.pointer(&format!("/teams/{side}/team/name"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn arr(v: Option<&Value>) -> impl Iterator<Item = &Value> {
    v.and_then(Value::as_array)
        .map(|a| a.iter())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed(state: &str) -> Value {
        json!({
            "dates": [{
                "date": "2024-05-01",
                "games": [{
                    "status": { "abstractGameState": state },
                    "gameDate": "2024-05-01T23:05:00Z",
                    "teams": {
                        "home": { "team": { "name": "Yankees" }, "score": 0 },
                        "away": { "team": { "name": "Red Sox" }, "score": 0 }
                    }
                }]
            }]
        })
    }

    #[test]
    fn preview_game_scores_as_tbd() {
        let rows = parse_scores(&feed("Preview"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date.as_deref(), Some("2024-05-01"));
        assert_eq!(rows[0].home_team.as_deref(), Some("Yankees"));
        assert_eq!(rows[0].score, None);
    }

    #[test]
    fn live_game_carries_running_score() {
        let mut doc = feed("Live");
        doc["dates"][0]["games"][0]["teams"]["home"]["score"] = json!(3);
        doc["dates"][0]["games"][0]["teams"]["away"]["score"] = json!(1);
        let rows = parse_scores(&doc);
        assert_eq!(rows[0].score.as_deref(), Some("3-1"));
    }

    #[test]
    fn fixtures_keep_preview_only() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(parse_fixtures(&feed("Preview"), date).len(), 1);
        assert_eq!(parse_fixtures(&feed("Live"), date).len(), 0);
        let fx = parse_fixtures(&feed("Preview"), date);
        assert_eq!(fx[0].time.as_deref(), Some("23:05"));
    }

    #[test]
    fn time_slice_tolerates_malformed_timestamps() {
        assert_eq!(iso_time_of_day("2024-05-01T23:05:00Z").as_deref(), Some("23:05"));
        assert_eq!(iso_time_of_day("no-time-here"), None);
        assert_eq!(iso_time_of_day("2024-05-01T9"), None);
    }
}
