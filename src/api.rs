// src/api.rs
// Thin routing layer over the aggregator service: translate query params,
// map typed outcomes onto status codes, serialize. No pipeline logic here.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::export::CsvExporter;
use crate::service::{Aggregator, QueryError, DEFAULT_LOOKAHEAD_DAYS, MAX_LOOKAHEAD_DAYS};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    /// Snapshot CSVs, written opportunistically after full-pipeline reads.
    /// `None` disables export entirely.
    pub exporter: Option<Arc<CsvExporter>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(|| async { "ok" }))
        .route("/scores", get(all_scores))
        .route("/scores/{sport}", get(scores_by_sport))
        .route("/fixtures", get(all_fixtures))
        .route("/fixtures/{sport}", get(fixtures_by_sport))
        .route("/fixtures/soccer/{league}", get(fixtures_by_league))
        .route("/predictions", get(all_predictions))
        .route("/predictions/{sport}", get(predictions_by_sport))
        .route("/predictions/soccer/{league}", get(predictions_by_league))
        // GET kept alongside POST; the frontend refresh button uses GET.
        .route("/refresh", get(refresh).post(refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

fn map_query_error(e: QueryError, no_data_msg: String) -> ApiError {
    match e {
        QueryError::NoData => ApiError(StatusCode::NOT_FOUND, no_data_msg),
        QueryError::AllSourcesDown => ApiError(
            StatusCode::SERVICE_UNAVAILABLE,
            "Predictions sources down; retry later".to_string(),
        ),
    }
}

async fn home() -> Json<serde_json::Value> {
    Json(json!({ "message": "Sports API - Scores, Predictions & Fixtures" }))
}

#[derive(serde::Deserialize)]
struct ScoresQuery {
    date: Option<String>,
}

fn parse_date(q: &ScoresQuery) -> Result<Option<NaiveDate>, ApiError> {
    match q.date.as_deref() {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ApiError(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("invalid date '{s}', expected YYYY-MM-DD"),
                )
            }),
    }
}

async fn all_scores(
    State(state): State<AppState>,
    Query(q): Query<ScoresQuery>,
) -> Result<Response, ApiError> {
    let date = parse_date(&q)?;
    let shown = date.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let events = state
        .aggregator
        .scores(date)
        .await
        .map_err(|e| map_query_error(e, format!("No scores for {shown}")))?;

    if let Some(exporter) = &state.exporter {
        if let Err(e) = exporter.export_scores(&events) {
            tracing::warn!(error = %e, "scores csv export failed");
        }
    }
    Ok(Json(&*events).into_response())
}

async fn scores_by_sport(
    State(state): State<AppState>,
    Path(sport): Path<String>,
    Query(q): Query<ScoresQuery>,
) -> Result<Response, ApiError> {
    let date = parse_date(&q)?;
    let shown = date.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let events = state
        .aggregator
        .scores_for_sport(&sport, date)
        .await
        .map_err(|e| map_query_error(e, format!("No {sport} scores for {shown} (check season)")))?;
    Ok(Json(events).into_response())
}

#[derive(serde::Deserialize)]
struct FixturesQuery {
    days_ahead: Option<u32>,
}

fn parse_days(q: &FixturesQuery) -> Result<u32, ApiError> {
    let days = q.days_ahead.unwrap_or(DEFAULT_LOOKAHEAD_DAYS);
    if !(1..=MAX_LOOKAHEAD_DAYS).contains(&days) {
        return Err(ApiError(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("days_ahead must be between 1 and {MAX_LOOKAHEAD_DAYS}"),
        ));
    }
    Ok(days)
}

async fn all_fixtures(
    State(state): State<AppState>,
    Query(q): Query<FixturesQuery>,
) -> Result<Response, ApiError> {
    let days = parse_days(&q)?;
    let fixtures = state
        .aggregator
        .fixtures(days)
        .await
        .map_err(|e| map_query_error(e, format!("No fixtures found for next {days} days")))?;

    if let Some(exporter) = &state.exporter {
        if let Err(e) = exporter.export_fixtures(&fixtures) {
            tracing::warn!(error = %e, "fixtures csv export failed");
        }
    }
    Ok(Json(&*fixtures).into_response())
}

async fn fixtures_by_sport(
    State(state): State<AppState>,
    Path(sport): Path<String>,
    Query(q): Query<FixturesQuery>,
) -> Result<Response, ApiError> {
    let days = parse_days(&q)?;
    let fixtures = state
        .aggregator
        .fixtures_for_sport(&sport, days)
        .await
        .map_err(|e| map_query_error(e, format!("No {sport} fixtures for next {days} days")))?;
    Ok(Json(fixtures).into_response())
}

async fn fixtures_by_league(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(q): Query<FixturesQuery>,
) -> Result<Response, ApiError> {
    let days = parse_days(&q)?;
    let fixtures = state
        .aggregator
        .soccer_fixtures_for_league(&league, days)
        .await
        .map_err(|e| map_query_error(e, format!("No {league} fixtures for next {days} days")))?;
    Ok(Json(fixtures).into_response())
}

async fn all_predictions(State(state): State<AppState>) -> Result<Response, ApiError> {
    let predictions = state
        .aggregator
        .predictions()
        .await
        .map_err(|e| map_query_error(e, "No predictions available".to_string()))?;

    if let Some(exporter) = &state.exporter {
        if let Err(e) = exporter.export_predictions(&predictions) {
            tracing::warn!(error = %e, "predictions csv export failed");
        }
    }
    Ok(Json(&*predictions).into_response())
}

async fn predictions_by_sport(
    State(state): State<AppState>,
    Path(sport): Path<String>,
) -> Result<Response, ApiError> {
    let predictions = state
        .aggregator
        .predictions_for_sport(&sport)
        .await
        .map_err(|e| map_query_error(e, format!("No predictions for {sport}")))?;
    Ok(Json(predictions).into_response())
}

async fn predictions_by_league(
    State(state): State<AppState>,
    Path(league): Path<String>,
) -> Result<Response, ApiError> {
    let predictions = state
        .aggregator
        .soccer_predictions_for_league(&league)
        .await
        .map_err(|e| map_query_error(e, format!("No {league} predictions")))?;
    Ok(Json(predictions).into_response())
}

async fn refresh(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.aggregator.invalidate_cache().await;
    Json(json!({ "message": "Cache refreshed" }))
}
