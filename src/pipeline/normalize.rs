// src/pipeline/normalize.rs
// Raw extraction -> canonical schema. Pure functions of their input: no
// network, no side effects, so every mapping is testable against captured
// upstream payloads.

use chrono::NaiveDate;
use once_cell::sync::OnceCell;

use crate::pipeline::source::{RawFixture, RawPrediction, RawScore};
use crate::schema::{Event, Fixture, Prediction, Sport, STATUS_UPCOMING, TBD, UNKNOWN};

/// Sentinel score emitted when a source is reachable but the season has no
/// games (distinguishes "nothing to show" from "nothing attempted").
pub const NO_GAMES_SCHEDULED: &str = "No games scheduled";

/// Clean text pulled out of HTML: decode entities, collapse whitespace, trim.
pub fn clean_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

fn team_or_unknown(v: Option<String>) -> String {
    match v {
        Some(s) => {
            let cleaned = clean_text(&s);
            if cleaned.is_empty() {
                UNKNOWN.to_string()
            } else {
                cleaned
            }
        }
        None => UNKNOWN.to_string(),
    }
}

fn text_or(v: Option<String>, sentinel: &str) -> String {
    match v {
        Some(s) => {
            let cleaned = clean_text(&s);
            if cleaned.is_empty() {
                sentinel.to_string()
            } else {
                cleaned
            }
        }
        None => sentinel.to_string(),
    }
}

/// NaN and infinities are not representable in JSON; coerce them to null so
/// every snapshot serializes losslessly.
pub fn sanitize_prob(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

pub fn event(raw: RawScore, query_date: NaiveDate) -> Event {
    Event {
        sport: raw.sport,
        league: raw.league,
        date: text_or(raw.date, &query_date.to_string()),
        home_team: team_or_unknown(raw.home_team),
        away_team: team_or_unknown(raw.away_team),
        score: text_or(raw.score, TBD),
    }
}

pub fn fixture(raw: RawFixture, window_start: NaiveDate) -> Fixture {
    Fixture {
        sport: raw.sport,
        league: raw.league,
        date: text_or(raw.date, &window_start.to_string()),
        time: text_or(raw.time, TBD),
        home_team: team_or_unknown(raw.home_team),
        away_team: team_or_unknown(raw.away_team),
        status: STATUS_UPCOMING.to_string(),
        note: raw.note,
    }
}

pub fn prediction(raw: RawPrediction) -> Prediction {
    Prediction {
        sport: raw.sport,
        league: raw.league,
        home_team: team_or_unknown(raw.home_team),
        away_team: team_or_unknown(raw.away_team),
        home_win_prob: sanitize_prob(raw.home_win_prob),
        draw_prob: sanitize_prob(raw.draw_prob),
        away_win_prob: sanitize_prob(raw.away_win_prob),
        note: raw.note,
        error: raw.error,
    }
}

/// Explicit off-season record for a reachable-but-empty source.
pub fn season_sentinel(sport: Sport, league: &str, date: NaiveDate) -> Event {
    Event {
        sport,
        league: league.to_string(),
        date: date.to_string(),
        home_team: UNKNOWN.to_string(),
        away_team: UNKNOWN.to_string(),
        score: NO_GAMES_SCHEDULED.to_string(),
    }
}
