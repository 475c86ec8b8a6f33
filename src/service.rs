// src/service.rs
// Boundary entry points the routing layer calls: one per pipeline, plus the
// sport/league-narrowed variants and cache invalidation. This is where the
// distinct "no data" and "all sources down" conditions are decided.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::cache::ResultCache;
use crate::config::Config;
use crate::fetch;
use crate::pipeline::pace::{Pacer, TokioPacer};
use crate::pipeline::source::{FixtureSource, Lookahead, PredictionSource, ScoreSource};
use crate::pipeline::{self, sources};
use crate::query;
use crate::schema::{Event, Fixture, Prediction, Sport};

/// Upper bound on the fixtures lookahead, enforced at the routing layer.
pub const MAX_LOOKAHEAD_DAYS: u32 = 30;
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 7;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The query ran but nothing matched (empty snapshot, unknown sport,
    /// league substring with no hits). Distinct from an ordinary empty list.
    #[error("no data for this query")]
    NoData,
    /// Every predictions source failed; the snapshot is nothing but
    /// error-tagged records.
    #[error("prediction sources down; retry later")]
    AllSourcesDown,
}

pub struct Aggregator {
    score_sources: Vec<Box<dyn ScoreSource>>,
    fixture_sources: Vec<Box<dyn FixtureSource>>,
    prediction_sources: Vec<Box<dyn PredictionSource>>,
    scores_cache: ResultCache<NaiveDate, Vec<Event>>,
    fixtures_cache: ResultCache<u32, Vec<Fixture>>,
    predictions_cache: ResultCache<(), Vec<Prediction>>,
}

impl Aggregator {
    /// Production wiring: real adapters, real sleeps.
    pub fn from_config(cfg: &Config) -> Self {
        let pacer: Arc<dyn Pacer> = Arc::new(TokioPacer);
        Self::with_sources(
            sources::score_sources(cfg, pacer.clone()),
            sources::fixture_sources(cfg, pacer.clone()),
            sources::prediction_sources(cfg, pacer),
        )
    }

    /// Explicit adapter sets; integration tests hand in mocks here.
    pub fn with_sources(
        score_sources: Vec<Box<dyn ScoreSource>>,
        fixture_sources: Vec<Box<dyn FixtureSource>>,
        prediction_sources: Vec<Box<dyn PredictionSource>>,
    ) -> Self {
        Self {
            score_sources,
            fixture_sources,
            prediction_sources,
            scores_cache: ResultCache::new(),
            fixtures_cache: ResultCache::new(),
            predictions_cache: ResultCache::new(),
        }
    }

    /// Full scores snapshot for a date (default: today). Memoized until the
    /// date changes or the cache is invalidated.
    pub async fn scores(&self, date: Option<NaiveDate>) -> Result<Arc<Vec<Event>>, QueryError> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let snapshot = self
            .scores_cache
            .get_or_compute(date, || async move {
                match fetch::build_client() {
                    Ok(client) => pipeline::run_scores(&self.score_sources, &client, date).await,
                    Err(e) => {
                        tracing::error!(error = %e, "http client unavailable");
                        Vec::new()
                    }
                }
            })
            .await;

        if snapshot.is_empty() {
            return Err(QueryError::NoData);
        }
        Ok(snapshot)
    }

    pub async fn scores_for_sport(
        &self,
        sport: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Event>, QueryError> {
        let all = self.scores(date).await?;
        let filtered = query::filter_by_sport(&all, sport, |e| e.sport);
        if filtered.is_empty() {
            return Err(QueryError::NoData);
        }
        Ok(filtered)
    }

    /// Full fixtures snapshot for the `[today, today + days]` window.
    pub async fn fixtures(&self, days: u32) -> Result<Arc<Vec<Fixture>>, QueryError> {
        let snapshot = self
            .fixtures_cache
            .get_or_compute(days, || async move {
                let window = Lookahead::from_today(days);
                match fetch::build_client() {
                    Ok(client) => {
                        pipeline::run_fixtures(&self.fixture_sources, &client, window).await
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "http client unavailable");
                        Vec::new()
                    }
                }
            })
            .await;

        if snapshot.is_empty() {
            return Err(QueryError::NoData);
        }
        Ok(snapshot)
    }

    pub async fn fixtures_for_sport(&self, sport: &str, days: u32) -> Result<Vec<Fixture>, QueryError> {
        let all = self.fixtures(days).await?;
        let filtered = query::filter_by_sport(&all, sport, |f| f.sport);
        if filtered.is_empty() {
            return Err(QueryError::NoData);
        }
        Ok(filtered)
    }

    pub async fn soccer_fixtures_for_league(
        &self,
        league: &str,
        days: u32,
    ) -> Result<Vec<Fixture>, QueryError> {
        let all = self.fixtures(days).await?;
        let soccer = query::filter_by_sport(&all, Sport::Soccer.as_str(), |f| f.sport);
        let filtered = query::filter_by_league(&soccer, league, |f| f.league.as_str());
        if filtered.is_empty() {
            return Err(QueryError::NoData);
        }
        Ok(filtered)
    }

    /// Full predictions snapshot. All-error snapshots surface as
    /// `AllSourcesDown`, not as a normal result.
    pub async fn predictions(&self) -> Result<Arc<Vec<Prediction>>, QueryError> {
        let snapshot = self
            .predictions_cache
            .get_or_compute((), || async move {
                match fetch::build_client() {
                    Ok(client) => {
                        pipeline::run_predictions(&self.prediction_sources, &client).await
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "http client unavailable");
                        Vec::new()
                    }
                }
            })
            .await;

        if snapshot.is_empty() || snapshot.iter().all(|p| p.error.is_some()) {
            return Err(QueryError::AllSourcesDown);
        }
        Ok(snapshot)
    }

    pub async fn predictions_for_sport(&self, sport: &str) -> Result<Vec<Prediction>, QueryError> {
        let all = self.predictions().await?;
        let filtered = query::filter_by_sport(&all, sport, |p| p.sport);
        if filtered.is_empty() {
            return Err(QueryError::NoData);
        }
        Ok(filtered)
    }

    pub async fn soccer_predictions_for_league(
        &self,
        league: &str,
    ) -> Result<Vec<Prediction>, QueryError> {
        let all = self.predictions().await?;
        let soccer = query::filter_by_sport(&all, Sport::Soccer.as_str(), |p| p.sport);
        let filtered = query::filter_by_league(&soccer, league, |p| p.league.as_str());
        if filtered.is_empty() {
            return Err(QueryError::NoData);
        }
        Ok(filtered)
    }

    /// Clear every pipeline's slot; the next call of each re-runs its
    /// adapters.
    pub async fn invalidate_cache(&self) {
        self.scores_cache.invalidate().await;
        self.fixtures_cache.invalidate().await;
        self.predictions_cache.invalidate().await;
        tracing::info!("all pipeline caches invalidated");
    }
}
