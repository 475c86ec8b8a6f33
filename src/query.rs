// src/query.rs
// Narrowing a cached snapshot by sport or league. Resolution is shared with
// the orchestrator through `Sport::resolve_token`; unknown tokens are not an
// error, they just compare verbatim (and typically match nothing, which the
// service reports as a distinct no-data condition).

use crate::schema::Sport;

/// Does a stored record's sport match a user-supplied token?
pub fn sport_matches(stored: Sport, token: &str) -> bool {
    match Sport::resolve_token(token) {
        Some(resolved) => stored == resolved,
        None => stored.as_str().eq_ignore_ascii_case(token),
    }
}

/// Case-insensitive substring match over the free-text league field, so
/// "premier" finds "Premier League".
pub fn league_matches(stored: &str, needle: &str) -> bool {
    stored.to_lowercase().contains(&needle.to_lowercase())
}

pub fn filter_by_sport<T: Clone>(records: &[T], token: &str, sport_of: impl Fn(&T) -> Sport) -> Vec<T> {
    records
        .iter()
        .filter(|r| sport_matches(sport_of(r), token))
        .cloned()
        .collect()
}

pub fn filter_by_league<T: Clone>(
    records: &[T],
    needle: &str,
    league_of: impl Fn(&T) -> &str,
) -> Vec<T> {
    records
        .iter()
        .filter(|r| league_matches(league_of(r), needle))
        .cloned()
        .collect()
}
