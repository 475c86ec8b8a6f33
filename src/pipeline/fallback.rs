// src/pipeline/fallback.rs
// Deterministic placeholder records for sources that are wholly unavailable.
// Every record is tagged through `note` so the degradation stays visible to
// callers; the aggregation itself never hard-fails for a sport.

use crate::pipeline::source::{Lookahead, RawFixture, RawPrediction};
use crate::schema::Sport;

pub const FALLBACK_NOTE: &str = "Fallback data - upstream source unavailable";
pub const SAMPLE_NOTE: &str = "Sample data - no fixtures found upstream";

const NBA_TEAMS: [&str; 8] = [
    "Lakers", "Warriors", "Celtics", "Bulls", "Knicks", "Heat", "Mavericks", "Nuggets",
];
const NFL_TEAMS: [&str; 8] = [
    "Chiefs", "49ers", "Ravens", "Packers", "Cowboys", "Eagles", "Bills", "Dolphins",
];

/// Placeholder fixtures for one failed soccer league: up to three days of
/// synthetic matches starting at the window start, teams derived from the
/// league name.
pub fn soccer_fixtures(league: &str, window: Lookahead) -> Vec<RawFixture> {
    let stem = league.split_whitespace().next().unwrap_or(league);
    let days = window.days.min(3);
    (0..i64::from(days))
        .map(|i| RawFixture {
            sport: Sport::Soccer,
            league: league.to_string(),
            date: Some((window.start + chrono::Duration::days(i)).to_string()),
            time: Some("15:00".to_string()),
            home_team: Some(format!("{stem} Home Team")),
            away_team: Some(format!("{stem} Away Team")),
            note: Some(FALLBACK_NOTE.to_string()),
        })
        .collect()
}

/// NBA placeholder rotation, starting tomorrow.
pub fn nba_fixtures(window: Lookahead) -> Vec<RawFixture> {
    let days = window.days.min(3) as usize;
    (0..days)
        .map(|i| RawFixture {
            sport: Sport::Nba,
            league: "NBA".to_string(),
            date: Some((window.start + chrono::Duration::days(i as i64 + 1)).to_string()),
            time: Some("19:30".to_string()),
            home_team: Some(NBA_TEAMS[i % NBA_TEAMS.len()].to_string()),
            away_team: Some(NBA_TEAMS[(i + 2) % NBA_TEAMS.len()].to_string()),
            note: Some(FALLBACK_NOTE.to_string()),
        })
        .collect()
}

/// NFL placeholder rotation, starting the day after tomorrow.
pub fn nfl_fixtures(window: Lookahead) -> Vec<RawFixture> {
    let days = window.days.min(2) as usize;
    (0..days)
        .map(|i| RawFixture {
            sport: Sport::Nfl,
            league: "NFL".to_string(),
            date: Some((window.start + chrono::Duration::days(i as i64 + 2)).to_string()),
            time: Some("13:00".to_string()),
            home_team: Some(NFL_TEAMS[i % NFL_TEAMS.len()].to_string()),
            away_team: Some(NFL_TEAMS[(i + 4) % NFL_TEAMS.len()].to_string()),
            note: Some(FALLBACK_NOTE.to_string()),
        })
        .collect()
}

/// Single placeholder record when the soccer odds scrape fails outright.
pub fn soccer_prediction() -> Vec<RawPrediction> {
    vec![RawPrediction {
        sport: Sport::Soccer,
        league: "Premier League".to_string(),
        home_team: Some("Manchester United".to_string()),
        away_team: Some("Liverpool".to_string()),
        home_win_prob: Some(45.0),
        draw_prob: Some(25.0),
        away_win_prob: Some(30.0),
        note: Some(FALLBACK_NOTE.to_string()),
        error: None,
    }]
}

/// Minimal sample snapshot for a fixtures run that ended completely empty.
pub fn sample_fixtures(window: Lookahead) -> Vec<RawFixture> {
    let today = window.start.to_string();
    vec![
        RawFixture {
            sport: Sport::Soccer,
            league: "Premier League".to_string(),
            date: Some(today.clone()),
            time: Some("15:00".to_string()),
            home_team: Some("Manchester United".to_string()),
            away_team: Some("Liverpool".to_string()),
            note: Some(SAMPLE_NOTE.to_string()),
        },
        RawFixture {
            sport: Sport::Mlb,
            league: "MLB".to_string(),
            date: Some(today),
            time: Some("19:05".to_string()),
            home_team: Some("New York Yankees".to_string()),
            away_team: Some("Boston Red Sox".to_string()),
            note: Some(SAMPLE_NOTE.to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window(days: u32) -> Lookahead {
        Lookahead::starting(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), days)
    }

    #[test]
    fn soccer_fallback_is_deterministic_and_tagged() {
        let a = soccer_fixtures("Premier League", window(7));
        let b = soccer_fixtures("Premier League", window(7));
        assert_eq!(a.len(), 3);
        assert_eq!(a[0].home_team.as_deref(), Some("Premier Home Team"));
        assert_eq!(a[0].date.as_deref(), Some("2024-05-01"));
        assert!(a.iter().all(|f| f.note.as_deref() == Some(FALLBACK_NOTE)));
        assert_eq!(
            a.iter().map(|f| f.date.clone()).collect::<Vec<_>>(),
            b.iter().map(|f| f.date.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn fallback_range_shrinks_with_short_lookahead() {
        assert_eq!(soccer_fixtures("MLS", window(1)).len(), 1);
        assert_eq!(nba_fixtures(window(2)).len(), 2);
        assert_eq!(nfl_fixtures(window(1)).len(), 1);
    }

    #[test]
    fn nba_rotation_starts_tomorrow() {
        let fx = nba_fixtures(window(7));
        assert_eq!(fx[0].date.as_deref(), Some("2024-05-02"));
        assert_eq!(fx[0].home_team.as_deref(), Some("Lakers"));
        assert_eq!(fx[0].away_team.as_deref(), Some("Celtics"));
    }
}
