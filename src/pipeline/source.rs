// src/pipeline/source.rs
// Adapter contract: raw record shapes, the typed per-invocation outcome, and
// the error taxonomy every upstream failure is folded into.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::schema::Sport;

#[derive(Debug, Error)]
pub enum SourceError {
    /// Network failure, timeout, or non-2xx status.
    #[error("source unavailable: {0}")]
    Unavailable(String),
    /// Expected element/field absent or malformed.
    #[error("parse failure: {0}")]
    Parse(String),
    /// Source reachable but structurally empty (off-season).
    #[error("no data for the current season")]
    NoDataForSeason,
}

/// Typed result of one adapter invocation. The orchestrator matches on this
/// to choose fallback vs. skip instead of adapters swallowing failures.
#[derive(Debug)]
pub enum SourceOutcome<T> {
    Complete(Vec<T>),
    Partial { records: Vec<T>, cause: SourceError },
    Failed(SourceError),
}

/// Raw extraction from one scores upstream. Fields the upstream failed to
/// yield stay `None`; the normalization mapper fills sentinels.
#[derive(Debug, Clone)]
pub struct RawScore {
    pub sport: Sport,
    pub league: String,
    pub date: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub score: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RawFixture {
    pub sport: Sport,
    pub league: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RawPrediction {
    pub sport: Sport,
    pub league: String,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_win_prob: Option<f64>,
    pub draw_prob: Option<f64>,
    pub away_win_prob: Option<f64>,
    pub note: Option<String>,
    pub error: Option<String>,
}

/// The `[today, today + days]` range bounding a fixtures query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookahead {
    pub start: NaiveDate,
    pub days: u32,
}

impl Lookahead {
    pub fn starting(start: NaiveDate, days: u32) -> Self {
        Self { start, days }
    }

    pub fn from_today(days: u32) -> Self {
        Self::starting(chrono::Utc::now().date_naive(), days)
    }

    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(i64::from(self.days))
    }

    /// Inclusive containment check applied before accepting a row.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end()
    }

    /// One date per upstream request for the per-day JSON adapters.
    pub fn request_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..i64::from(self.days)).map(|i| self.start + Duration::days(i))
    }
}

#[async_trait]
pub trait ScoreSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, client: &reqwest::Client, date: NaiveDate) -> SourceOutcome<RawScore>;

    /// Placeholder records substituted when `fetch` fails outright. Empty
    /// means skip-and-continue.
    fn fallback(&self, _date: NaiveDate) -> Vec<RawScore> {
        Vec::new()
    }

    /// Sentinel identity used when this source reports an empty season.
    fn identity(&self) -> (Sport, &str);
}

#[async_trait]
pub trait FixtureSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, client: &reqwest::Client, window: Lookahead)
        -> SourceOutcome<RawFixture>;

    fn fallback(&self, _window: Lookahead) -> Vec<RawFixture> {
        Vec::new()
    }
}

#[async_trait]
pub trait PredictionSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, client: &reqwest::Client) -> SourceOutcome<RawPrediction>;

    fn fallback(&self) -> Vec<RawPrediction> {
        Vec::new()
    }

    /// Identity stamped onto the error-tagged record when this source fails
    /// and has no fallback.
    fn identity(&self) -> (Sport, &str);
}

/// GET a page, folding transport errors and non-2xx statuses into
/// `SourceError::Unavailable`.
pub async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, SourceError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| SourceError::Unavailable(e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::Unavailable(format!("http {status} from {url}")));
    }
    resp.text()
        .await
        .map_err(|e| SourceError::Unavailable(e.to_string()))
}

/// GET and decode a JSON document.
pub async fn get_json(client: &reqwest::Client, url: &str) -> Result<serde_json::Value, SourceError> {
    let body = get_text(client, url).await?;
    serde_json::from_str(&body).map_err(|e| SourceError::Parse(format!("invalid json: {e}")))
}
