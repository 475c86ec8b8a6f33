// src/pipeline/sources/nfl.rs
// NFL scoreboard via ESPN's site API: one aggregate call, events filtered to
// the lookahead window.

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

pub struct NflFixtures {
    url: String,
    limiter: RateLimiter,
}

impl NflFixtures {
    pub fn new(url: String, limiter: RateLimiter) -> Self {
        Self { url, limiter }
    }
}

#[async_trait]
impl FixtureSource for NflFixtures {
    fn name(&self) -> &'static str {
        "nfl-espn"
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
        fallback::nfl_fixtures(window)
    }
}

/// Events carry a full ISO timestamp; home is listed first among the
/// competitors.
pub fn parse_fixtures(doc: &Value, window: Lookahead) -> Vec<RawFixture> {
    let events = doc.pointer("/events").and_then(Value::as_array);

    let mut out = Vec::new();
    for event in events.into_iter().flatten() {
        let ts = event.pointer("/date").and_then(Value::as_str).unwrap_or("");
        let Some(date) = ts
            .split('T')
            .next()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if !window.contains(date) {
            continue;
        }

        let competitors = event
            .pointer("/competitions/0/competitors")
            .and_then(Value::as_array);
        let Some(competitors) = competitors.filter(|c| c.len() >= 2) else {
            continue;
        };

        out.push(RawFixture {
            sport: Sport::Nfl,
            league: "NFL".to_string(),
            date: Some(date.to_string()),
            time: iso_time_of_day(ts),
            home_team: display_name(&competitors[0]),
            away_team: display_name(&competitors[1]),
            note: None,
        });
    }
    out
}

fn display_name(competitor: &Value) -> Option<String> {
    competitor
        .pointer("/team/displayName")
        .and_then(Value::as_str)
        .map(str::to_string)
}
