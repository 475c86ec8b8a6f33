// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "MATCHDAY_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/leagues.toml";

/// One scraped soccer competition: a FBref schedule page for scores and an
/// ESPN fixtures page for upcoming matches.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SoccerLeague {
    pub name: String,
    pub scores_url: String,
    pub fixtures_url: String,
}

/// Upstream endpoint templates. `{date}` is substituted per request where
/// present.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Endpoints {
    pub mlb_schedule: String,
    pub nhl_schedule: String,
    pub nba_scoreboard: String,
    pub nfl_scoreboard: String,
    pub soccer_odds: String,
    pub mlb_playoff_odds: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            mlb_schedule:
                "https://statsapi.mlb.com/api/v1/schedule?hydrate=game(content(summary)),team&date={date}&sportId=1"
                    .to_string(),
            nhl_schedule: "https://api-web.nhle.com/v1/schedule/{date}".to_string(),
            nba_scoreboard:
                "https://cdn.nba.com/static/json/liveData/scoreboard/todaysScoreboard_00.json"
                    .to_string(),
            nfl_scoreboard:
                "https://site.api.espn.com/apis/site/v2/sports/football/nfl/scoreboard".to_string(),
            soccer_odds: "https://www.oddsportal.com/matches/soccer/".to_string(),
            mlb_playoff_odds:
                "https://www.baseball-reference.com/leagues/majors/2025-playoff-odds.shtml"
                    .to_string(),
        }
    }
}

pub fn render_dated(template: &str, date: chrono::NaiveDate) -> String {
    template.replace("{date}", &date.to_string())
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_leagues")]
    pub leagues: Vec<SoccerLeague>,
    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leagues: default_leagues(),
            endpoints: Endpoints::default(),
        }
    }
}

fn default_leagues() -> Vec<SoccerLeague> {
    [
        ("Premier League", "9/schedule/Premier-League-Scores-and-Fixtures", "eng.1"),
        ("La Liga", "12/schedule/La-Liga-Scores-and-Fixtures", "esp.1"),
        ("Bundesliga", "20/schedule/Bundesliga-Scores-and-Fixtures", "ger.1"),
        ("Serie A", "11/schedule/Serie-A-Scores-and-Fixtures", "ita.1"),
        ("Ligue 1", "13/schedule/Ligue-1-Scores-and-Fixtures", "fra.1"),
        ("MLS", "22/schedule/Major-League-Soccer-Scores-and-Fixtures", "usa.1"),
    ]
    .into_iter()
    .map(|(name, fbref, espn)| SoccerLeague {
        name: name.to_string(),
        scores_url: format!("https://fbref.com/en/comps/{fbref}"),
        fixtures_url: format!("https://www.espn.com/soccer/fixtures/_/league/{espn}"),
    })
    .collect()
}

/// Load configuration from an explicit TOML file.
pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Load configuration using env var + fallbacks:
/// 1) $MATCHDAY_CONFIG_PATH
/// 2) config/leagues.toml
/// 3) compiled-in defaults
pub fn load_default() -> Result<Config> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("MATCHDAY_CONFIG_PATH points to non-existent path"));
    }
    let default = PathBuf::from(DEFAULT_PATH);
    if default.exists() {
        return load_from(&default);
    }
    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn defaults_cover_six_leagues() {
        let cfg = Config::default();
        assert_eq!(cfg.leagues.len(), 6);
        assert_eq!(cfg.leagues[0].name, "Premier League");
        assert!(cfg.leagues[0].scores_url.contains("fbref.com"));
        assert!(cfg.leagues[0].fixtures_url.contains("espn.com"));
    }

    #[test]
    fn dated_template_substitutes() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let url = render_dated("https://api-web.nhle.com/v1/schedule/{date}", d);
        assert_eq!(url, "https://api-web.nhle.com/v1/schedule/2024-05-01");
    }

    #[test]
    fn partial_toml_falls_back_per_field() {
        let toml = r#"
            [[leagues]]
            name = "Premier League"
            scores_url = "https://fbref.test/pl"
            fixtures_url = "https://espn.test/pl"
        "#;
        let cfg: Config = toml::from_str(toml).unwrap();
        assert_eq!(cfg.leagues.len(), 1);
        // endpoints keep their defaults when the file omits them
        assert!(cfg.endpoints.nhl_schedule.contains("api-web.nhle.com"));
    }

    #[serial_test::serial]
    #[test]
    fn env_override_wins_and_missing_path_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("leagues.toml");
        std::fs::write(
            &p,
            r#"
                [[leagues]]
                name = "La Liga"
                scores_url = "https://fbref.test/laliga"
                fixtures_url = "https://espn.test/laliga"
            "#,
        )
        .unwrap();

        env::set_var(ENV_PATH, p.display().to_string());
        let cfg = load_default().unwrap();
        assert_eq!(cfg.leagues[0].name, "La Liga");

        env::set_var(ENV_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(load_default().is_err());
        env::remove_var(ENV_PATH);
    }
}
