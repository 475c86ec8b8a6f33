// src/pipeline/mod.rs
pub mod fallback;
pub mod normalize;
pub mod pace;
pub mod source;
pub mod sources;

use chrono::NaiveDate;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::schema::{self, Event, Fixture, Prediction};
use source::{FixtureSource, Lookahead, PredictionSource, RawPrediction, ScoreSource, SourceError, SourceOutcome};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "aggregate_records_total",
            "Records emitted into snapshots, per pipeline."
        );
        describe_counter!(
            "aggregate_source_errors_total",
            "Adapter invocations that failed or degraded."
        );
        describe_counter!(
            "aggregate_fallback_records_total",
            "Placeholder records synthesized for failed sources."
        );
        describe_gauge!(
            "aggregate_last_run_ts",
            "Unix ts when an aggregation pipeline last ran."
        );
    });
}

fn stamp_run(pipeline: &'static str, emitted: usize) {
    counter!("aggregate_records_total", "pipeline" => pipeline).increment(emitted as u64);
    let now = chrono::Utc::now().timestamp().max(0) as f64;
    gauge!("aggregate_last_run_ts").set(now);
}

/// Run every scores adapter in order and merge into one sorted snapshot.
/// Failures stay inside the adapter boundary: a down source degrades to its
/// fallback records (or a season sentinel) and the siblings run regardless.
pub async fn run_scores(
    adapters: &[Box<dyn ScoreSource>],
    client: &reqwest::Client,
    date: NaiveDate,
) -> Vec<Event> {
    ensure_metrics_described();

    let mut events = Vec::new();
    for adapter in adapters {
        match adapter.fetch(client, date).await {
            SourceOutcome::Complete(raw) => {
                events.extend(raw.into_iter().map(|r| normalize::event(r, date)));
            }
            SourceOutcome::Partial { records, cause } => {
                tracing::warn!(source = adapter.name(), error = %cause, "scores source degraded");
                counter!("aggregate_source_errors_total", "pipeline" => "scores").increment(1);
                events.extend(records.into_iter().map(|r| normalize::event(r, date)));
            }
            SourceOutcome::Failed(SourceError::NoDataForSeason) => {
                let (sport, league) = adapter.identity();
                tracing::info!(source = adapter.name(), "no games this season");
                events.push(normalize::season_sentinel(sport, league, date));
            }
            SourceOutcome::Failed(cause) => {
                tracing::warn!(source = adapter.name(), error = %cause, "scores source failed");
                counter!("aggregate_source_errors_total", "pipeline" => "scores").increment(1);
                let placeholders = adapter.fallback(date);
                if !placeholders.is_empty() {
                    counter!("aggregate_fallback_records_total")
                        .increment(placeholders.len() as u64);
                    events.extend(placeholders.into_iter().map(|r| normalize::event(r, date)));
                }
            }
        }
    }

    stamp_run("scores", events.len());
    schema::sort_events(&mut events);
    events
}

/// Fixtures variant of the adapter loop. A run that ends with nothing at all
/// yields the tagged sample snapshot instead of an empty list.
pub async fn run_fixtures(
    adapters: &[Box<dyn FixtureSource>],
    client: &reqwest::Client,
    window: Lookahead,
) -> Vec<Fixture> {
    ensure_metrics_described();

    let mut fixtures = Vec::new();
    for adapter in adapters {
        match adapter.fetch(client, window).await {
            SourceOutcome::Complete(raw) => {
                fixtures.extend(raw.into_iter().map(|r| normalize::fixture(r, window.start)));
            }
            SourceOutcome::Partial { records, cause } => {
                tracing::warn!(source = adapter.name(), error = %cause, "fixtures source degraded");
                counter!("aggregate_source_errors_total", "pipeline" => "fixtures").increment(1);
                fixtures.extend(records.into_iter().map(|r| normalize::fixture(r, window.start)));
            }
            SourceOutcome::Failed(cause) => {
                tracing::warn!(source = adapter.name(), error = %cause, "fixtures source failed");
                counter!("aggregate_source_errors_total", "pipeline" => "fixtures").increment(1);
                let placeholders = adapter.fallback(window);
                if !placeholders.is_empty() {
                    counter!("aggregate_fallback_records_total")
                        .increment(placeholders.len() as u64);
                    fixtures.extend(
                        placeholders
                            .into_iter()
                            .map(|r| normalize::fixture(r, window.start)),
                    );
                }
            }
        }
    }

    if fixtures.is_empty() {
        fixtures.extend(
            fallback::sample_fixtures(window)
                .into_iter()
                .map(|r| normalize::fixture(r, window.start)),
        );
    }

    stamp_run("fixtures", fixtures.len());
    schema::sort_fixtures(&mut fixtures);
    fixtures
}

/// Predictions variant. A failed source with no fallback still leaves a
/// trace: an error-tagged record carrying its identity, which is what the
/// boundary's "all sources down" detection keys on.
pub async fn run_predictions(
    adapters: &[Box<dyn PredictionSource>],
    client: &reqwest::Client,
) -> Vec<Prediction> {
    ensure_metrics_described();

    let mut predictions = Vec::new();
    for adapter in adapters {
        match adapter.fetch(client).await {
            SourceOutcome::Complete(raw) => {
                predictions.extend(raw.into_iter().map(normalize::prediction));
            }
            SourceOutcome::Partial { records, cause } => {
                tracing::warn!(source = adapter.name(), error = %cause, "predictions source degraded");
                counter!("aggregate_source_errors_total", "pipeline" => "predictions").increment(1);
                predictions.extend(records.into_iter().map(normalize::prediction));
            }
            SourceOutcome::Failed(cause) => {
                tracing::warn!(source = adapter.name(), error = %cause, "predictions source failed");
                counter!("aggregate_source_errors_total", "pipeline" => "predictions").increment(1);
                let placeholders = adapter.fallback();
                if placeholders.is_empty() {
                    predictions.push(normalize::prediction(error_record(adapter.as_ref(), &cause)));
                } else {
                    counter!("aggregate_fallback_records_total")
                        .increment(placeholders.len() as u64);
                    predictions.extend(placeholders.into_iter().map(normalize::prediction));
                }
            }
        }
    }

    stamp_run("predictions", predictions.len());
    schema::sort_predictions(&mut predictions);
    predictions
}

fn error_record(adapter: &dyn PredictionSource, cause: &SourceError) -> RawPrediction {
    let (sport, league) = adapter.identity();
    RawPrediction {
        sport,
        league: league.to_string(),
        home_team: None,
        away_team: None,
        home_win_prob: None,
        draw_prob: None,
        away_win_prob: None,
        note: None,
        error: Some(cause.to_string()),
    }
}
