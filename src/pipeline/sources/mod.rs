// src/pipeline/sources/mod.rs
// One adapter per upstream, plus the default wiring used by the service.

pub mod mlb;
pub mod nba;
pub mod nfl;
pub mod nhl;
pub mod predictions;
pub mod soccer_fixtures;
pub mod soccer_scores;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::pipeline::pace::{Pacer, RateLimiter, RetryPolicy};
use crate::pipeline::source::{FixtureSource, PredictionSource, ScoreSource};

/// "2024-05-01T23:05:00Z" -> "23:05". Shared by every JSON adapter that
/// slices a time of day out of an ISO timestamp.
pub fn iso_time_of_day(ts: &str) -> Option<String> {
    let (_, time) = ts.split_once('T')?;
    if time.len() < 5 {
        return None;
    }
    Some(time[..5].to_string())
}

/// The scores pipeline: soccer (retried), MLB, NHL.
pub fn score_sources(cfg: &Config, pacer: Arc<dyn Pacer>) -> Vec<Box<dyn ScoreSource>> {
    vec![
        Box::new(soccer_scores::SoccerScores::new(
            cfg.leagues.clone(),
            RetryPolicy::soccer_scores(pacer.clone()),
            RateLimiter::new(Duration::from_secs(2), pacer.clone()),
        )),
        Box::new(mlb::MlbScores::new(
            cfg.endpoints.mlb_schedule.clone(),
            RateLimiter::new(Duration::from_secs(1), pacer.clone()),
        )),
        Box::new(nhl::NhlScores::new(
            cfg.endpoints.nhl_schedule.clone(),
            RateLimiter::new(Duration::from_secs(1), pacer),
        )),
    ]
}

/// The fixtures pipeline: all five sports.
pub fn fixture_sources(cfg: &Config, pacer: Arc<dyn Pacer>) -> Vec<Box<dyn FixtureSource>> {
    vec![
        Box::new(soccer_fixtures::SoccerFixtures::new(
            cfg.leagues.clone(),
            RateLimiter::new(Duration::from_secs(1), pacer.clone()),
        )),
        Box::new(mlb::MlbFixtures::new(
            cfg.endpoints.mlb_schedule.clone(),
            RateLimiter::new(Duration::from_millis(500), pacer.clone()),
        )),
        Box::new(nhl::NhlFixtures::new(
            cfg.endpoints.nhl_schedule.clone(),
            RateLimiter::new(Duration::from_millis(500), pacer.clone()),
        )),
        Box::new(nba::NbaFixtures::new(
            cfg.endpoints.nba_scoreboard.clone(),
            RateLimiter::new(Duration::from_millis(500), pacer.clone()),
        )),
        Box::new(nfl::NflFixtures::new(
            cfg.endpoints.nfl_scoreboard.clone(),
            RateLimiter::new(Duration::from_millis(500), pacer),
        )),
    ]
}

/// The predictions pipeline: scraped soccer odds, scraped MLB playoff odds,
/// fixed pass-through samples for the rest.
pub fn prediction_sources(cfg: &Config, pacer: Arc<dyn Pacer>) -> Vec<Box<dyn PredictionSource>> {
    vec![
        Box::new(predictions::SoccerOdds::new(
            cfg.endpoints.soccer_odds.clone(),
            RateLimiter::new(Duration::from_secs(1), pacer.clone()),
        )),
        Box::new(predictions::MlbPlayoffOdds::new(
            cfg.endpoints.mlb_playoff_odds.clone(),
            RateLimiter::new(Duration::from_secs(1), pacer),
        )),
        Box::new(predictions::StaticPredictions),
    ]
}
