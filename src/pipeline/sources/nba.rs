// src/pipeline/sources/nba.rs
// NBA live scoreboard: one aggregate call, numeric gameStatus 1 == not yet
// started.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::pipeline::fallback;
use crate::pipeline::pace::RateLimiter;
use crate::pipeline::source::{
    get_json, FixtureSource, Lookahead, RawFixture, SourceOutcome,
};
use crate::pipeline::sources::iso_time_of_day;
use crate::schema::Sport;

pub struct NbaFixtures {
    url: String,
    limiter: RateLimiter,
}

impl NbaFixtures {
    pub fn new(url: String, limiter: RateLimiter) -> Self {
        Self { url, limiter }
    }
}

#[async_trait]
impl FixtureSource for NbaFixtures {
    fn name(&self) -> &'static str {
        "nba-cdn"
    }

    async fn fetch(
        &self,
        client: &reqwest::Client,
        window: Lookahead,
    ) -> SourceOutcome<RawFixture> {
        let out = match get_json(client, &self.url).await {
            Ok(doc) => SourceOutcome::Complete(parse_fixtures(&doc, window)),
            Err(e) => SourceOutcome::Failed(e),
        };
        self.limiter.courtesy().await;
        out
    }

    fn fallback(&self, window: Lookahead) -> Vec<RawFixture> {
        fallback::nba_fixtures(window)
    }
}

pub fn parse_fixtures(doc: &Value, window: Lookahead) -> Vec<RawFixture> {
    let games = doc.pointer("/scoreboard/games").and_then(Value::as_array);

    let mut out = Vec::new();
    for game in games.into_iter().flatten() {
        if game.pointer("/gameStatus").and_then(Value::as_i64) != Some(1) {
            continue;
        }

        let ts = game.pointer("/gameTimeUTC").and_then(Value::as_str);
        let date = ts
            .and_then(|t| t.split('T').next())
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .unwrap_or(window.start);
        if !window.contains(date) {
            continue;
        }

        out.push(RawFixture {
            sport: Sport::Nba,
            league: "NBA".to_string(),
            date: Some(date.to_string()),
            time: ts.and_then(iso_time_of_day),
            home_team: team_name(game, "homeTeam"),
            away_team: team_name(game, "awayTeam"),
            note: None,
        });
    }
    out
}

fn team_name(game: &Value, side: &str) -> Option<String> {
    game.pointer(&format!("/{side}/teamName"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn window() -> Lookahead {
        Lookahead::starting(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 7)
    }

    fn feed(status: i64, ts: &str) -> Value {
        json!({
            "scoreboard": {
                "games": [{
                    "gameStatus": status,
                    "gameTimeUTC": ts,
                    "homeTeam": { "teamName": "Lakers" },
                    "awayTeam": { "teamName": "Nuggets" }
                }]
            }
        })
    }

    #[test]
    fn not_started_games_become_fixtures() {
        let fx = parse_fixtures(&feed(1, "2024-05-02T02:00:00Z"), window());
        assert_eq!(fx.len(), 1);
        assert_eq!(fx[0].date.as_deref(), Some("2024-05-02"));
        assert_eq!(fx[0].time.as_deref(), Some("02:00"));
        assert_eq!(fx[0].home_team.as_deref(), Some("Lakers"));
    }

    #[test]
    fn live_and_finished_games_are_filtered() {
        assert!(parse_fixtures(&feed(2, "2024-05-02T02:00:00Z"), window()).is_empty());
        assert!(parse_fixtures(&feed(3, "2024-05-02T02:00:00Z"), window()).is_empty());
    }

    #[test]
    fn games_outside_window_are_dropped() {
        assert!(parse_fixtures(&feed(1, "2024-06-02T02:00:00Z"), window()).is_empty());
    }
}
