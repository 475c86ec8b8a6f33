// src/schema.rs
// Canonical record shapes shared by all three pipelines.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Sentinel for a missing team name.
pub const UNKNOWN: &str = "Unknown";
/// Sentinel for a missing score or kickoff time.
pub const TBD: &str = "TBD";
/// The only fixture status the pipeline currently emits.
pub const STATUS_UPCOMING: &str = "Upcoming";

/// Closed set of sports the aggregator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Soccer,
    #[serde(rename = "MLB")]
    Mlb,
    #[serde(rename = "NHL")]
    Nhl,
    #[serde(rename = "NBA")]
    Nba,
    #[serde(rename = "NFL")]
    Nfl,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Soccer => "Soccer",
            Sport::Mlb => "MLB",
            Sport::Nhl => "NHL",
            Sport::Nba => "NBA",
            Sport::Nfl => "NFL",
        }
    }

    /// Resolve a user-supplied token ("soccer", "MLB", "Nhl", ...) to the
    /// canonical case. One lookup shared by the orchestrator and the query
    /// filter; unknown tokens resolve to `None` and are matched verbatim
    /// downstream.
    pub fn resolve_token(token: &str) -> Option<Sport> {
        match token.to_ascii_lowercase().as_str() {
            "soccer" => Some(Sport::Soccer),
            "mlb" => Some(Sport::Mlb),
            "nhl" => Some(Sport::Nhl),
            "nba" => Some(Sport::Nba),
            "nfl" => Some(Sport::Nfl),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed match in the scores pipeline. `score` is "H-A", "TBD", or
/// status text; the same logical match can show a different score on the
/// next run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub sport: Sport,
    pub league: String,
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub score: String,
}

/// One upcoming match in the fixtures pipeline. `note` is set only on
/// synthesized (fallback) records and serializes as null otherwise, so the
/// shape stays total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub sport: Sport,
    pub league: String,
    pub date: String,
    pub time: String,
    pub home_team: String,
    pub away_team: String,
    pub status: String,
    pub note: Option<String>,
}

/// One win-probability record. Probabilities are percentages; `draw_prob`
/// is null for sports without draws. `error` marks a record standing in for
/// a failed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub sport: Sport,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_win_prob: Option<f64>,
    pub draw_prob: Option<f64>,
    pub away_win_prob: Option<f64>,
    pub note: Option<String>,
    pub error: Option<String>,
}

// Deterministic snapshot orderings (string order over the sport name, so
// "MLB" < "NBA" < "NFL" < "NHL" < "Soccer").

pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        cmp_sport(a.sport, b.sport)
            .then_with(|| a.league.cmp(&b.league))
            .then_with(|| a.date.cmp(&b.date))
    });
}

pub fn sort_fixtures(fixtures: &mut [Fixture]) {
    fixtures.sort_by(|a, b| {
        cmp_sport(a.sport, b.sport)
            .then_with(|| a.league.cmp(&b.league))
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.time.cmp(&b.time))
    });
}

pub fn sort_predictions(predictions: &mut [Prediction]) {
    predictions.sort_by(|a, b| cmp_sport(a.sport, b.sport).then_with(|| a.league.cmp(&b.league)));
}

fn cmp_sport(a: Sport, b: Sport) -> Ordering {
    a.as_str().cmp(b.as_str())
}
