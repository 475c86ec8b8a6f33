// src/pipeline/sources/predictions.rs
// Win-probability sources. No modeling here: OddsPortal decimal odds invert
// to implied probabilities, Baseball-Reference playoff odds pass through, and
// the remaining sports carry fixed pass-through samples.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::pipeline::fallback;
use crate::pipeline::pace::RateLimiter;
use crate::pipeline::source::{
    get_text, PredictionSource, RawPrediction, SourceError, SourceOutcome,
};
use crate::schema::Sport;

static MATCH_ROWS: Lazy<Selector> = Lazy::new(|| Selector::parse(".deactivate").unwrap());
static PARTICIPANTS: Lazy<Selector> = Lazy::new(|| Selector::parse(".participant-name").unwrap());
static ODDS_CELLS: Lazy<Selector> = Lazy::new(|| Selector::parse(".odds-cell").unwrap());
static ODDS_TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table#playoff_odds").unwrap());
static BODY_ROWS: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody tr").unwrap());
static CELLS: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());

const MATCH_LIMIT: usize = 10;
const TEAM_LIMIT: usize = 5;

pub struct SoccerOdds {
    url: String,
    limiter: RateLimiter,
}

impl SoccerOdds {
    pub fn new(url: String, limiter: RateLimiter) -> Self {
        Self { url, limiter }
    }
}

#[async_trait]
impl PredictionSource for SoccerOdds {
    fn name(&self) -> &'static str {
        "soccer-oddsportal"
    }

    fn identity(&self) -> (Sport, &str) {
        (Sport::Soccer, "Various")
    }

    async fn fetch(&self, client: &reqwest::Client) -> SourceOutcome<RawPrediction> {
        let out = match get_text(client, &self.url).await {
            Ok(body) => SourceOutcome::Complete(parse_soccer_odds(&body)),
            Err(e) => SourceOutcome::Failed(e),
        };
        self.limiter.courtesy().await;
        out
    }

    fn fallback(&self) -> Vec<RawPrediction> {
        fallback::soccer_prediction()
    }
}

/// First ten match rows; decimal odds invert to implied percentages, with
/// unparseable cells ("-", suspended markets) surviving as null.
pub fn parse_soccer_odds(html: &str) -> Vec<RawPrediction> {
    let doc = Html::parse_document(html);

    let mut out = Vec::new();
    for row in doc.select(&MATCH_ROWS).take(MATCH_LIMIT) {
        let teams: Vec<String> = row
            .select(&PARTICIPANTS)
            .map(|t| t.text().collect::<String>().trim().to_string())
            .collect();
        if teams.len() < 2 {
            continue;
        }

        let odds: Vec<String> = row
            .select(&ODDS_CELLS)
            .map(|c| c.text().collect::<String>().trim().to_string())
            .collect();
        if odds.len() < 3 {
            continue;
        }

        out.push(RawPrediction {
            sport: Sport::Soccer,
            league: "Various".to_string(),
            home_team: Some(teams[0].clone()),
            away_team: Some(teams[1].clone()),
            home_win_prob: implied_probability(&odds[0]),
            draw_prob: implied_probability(&odds[1]),
            away_win_prob: implied_probability(&odds[2]),
            note: None,
            error: None,
        });
    }
    out
}

/// Decimal odds -> implied win percentage. Division by a parsed zero would
/// yield infinity; the normalizer's finiteness check nulls that out too, but
/// it never gets that far.
fn implied_probability(odds: &str) -> Option<f64> {
    let value: f64 = odds.parse().ok()?;
    if value <= 0.0 {
        return None;
    }
    Some(100.0 / value)
}

pub struct MlbPlayoffOdds {
    url: String,
    limiter: RateLimiter,
}

impl MlbPlayoffOdds {
    pub fn new(url: String, limiter: RateLimiter) -> Self {
        Self { url, limiter }
    }
}

#[async_trait]
impl PredictionSource for MlbPlayoffOdds {
    fn name(&self) -> &'static str {
        "mlb-bref"
    }

    fn identity(&self) -> (Sport, &str) {
        (Sport::Mlb, "MLB")
    }

    async fn fetch(&self, client: &reqwest::Client) -> SourceOutcome<RawPrediction> {
        let out = match get_text(client, &self.url).await {
            Ok(body) => match parse_playoff_odds(&body) {
                Ok(rows) => SourceOutcome::Complete(rows),
                Err(e) => SourceOutcome::Failed(e),
            },
            Err(e) => SourceOutcome::Failed(e),
        };
        self.limiter.courtesy().await;
        out
    }
}

/// First five body rows of the playoff-odds table. These are team-level
/// probabilities, not head-to-head: `away_team` is the literal "Opponent"
/// and the away probability is unknown.
pub fn parse_playoff_odds(html: &str) -> Result<Vec<RawPrediction>, SourceError> {
    let doc = Html::parse_document(html);
    let table = doc
        .select(&ODDS_TABLE)
        .next()
        .ok_or_else(|| SourceError::Parse("playoff odds table #playoff_odds missing".into()))?;

    let mut out = Vec::new();
    for row in table.select(&BODY_ROWS).take(TEAM_LIMIT) {
        let cells: Vec<String> = row
            .select(&CELLS)
            .map(|c| c.text().collect::<String>().trim().to_string())
            .collect();
        if cells.len() < 2 {
            continue;
        }

        out.push(RawPrediction {
            sport: Sport::Mlb,
            league: "MLB".to_string(),
            home_team: Some(cells[0].clone()),
            away_team: Some("Opponent".to_string()),
            home_win_prob: cells[1].trim_end_matches('%').parse().ok(),
            draw_prob: None,
            away_win_prob: None,
            note: None,
            error: None,
        });
    }
    Ok(out)
}

/// Fixed pass-through records for sports without a reliable free odds feed.
pub struct StaticPredictions;

#[async_trait]
impl PredictionSource for StaticPredictions {
    fn name(&self) -> &'static str {
        "static-samples"
    }

    fn identity(&self) -> (Sport, &str) {
        (Sport::Nba, "NBA")
    }

    async fn fetch(&self, _client: &reqwest::Client) -> SourceOutcome<RawPrediction> {
        let sample = |sport, league: &str, home: &str, away: &str, hp: f64, ap: f64| RawPrediction {
            sport,
            league: league.to_string(),
            home_team: Some(home.to_string()),
            away_team: Some(away.to_string()),
            home_win_prob: Some(hp),
            draw_prob: None,
            away_win_prob: Some(ap),
            note: Some("Sample prediction".to_string()),
            error: None,
        };
        SourceOutcome::Complete(vec![
            sample(Sport::Nba, "NBA", "Lakers", "Warriors", 60.0, 40.0),
            sample(Sport::Nfl, "NFL", "Chiefs", "49ers", 65.0, 35.0),
            sample(Sport::Nhl, "NHL", "Maple Leafs", "Bruins", 55.0, 45.0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ODDS_PAGE: &str = r#"
        <div class="deactivate">
          <span class="participant-name">Arsenal</span>
          <span class="participant-name">Chelsea</span>
          <span class="odds-cell">2.00</span>
          <span class="odds-cell">4.00</span>
          <span class="odds-cell">-</span>
        </div>
        <div class="deactivate">
          <span class="participant-name">Lone Team</span>
        </div>
    "#;

    #[test]
    fn decimal_odds_invert_to_percentages() {
        let rows = parse_soccer_odds(ODDS_PAGE);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].home_win_prob, Some(50.0));
        assert_eq!(rows[0].draw_prob, Some(25.0));
        assert_eq!(rows[0].away_win_prob, None);
    }

    #[test]
    fn zero_and_negative_odds_yield_null() {
        assert_eq!(implied_probability("0"), None);
        assert_eq!(implied_probability("-1.5"), None);
        assert_eq!(implied_probability("junk"), None);
    }

    #[test]
    fn playoff_odds_rows_pass_through() {
        let page = r#"
            <table id="playoff_odds"><tbody>
              <tr><td>Yankees</td><td>87.5%</td></tr>
              <tr><td>Orioles</td><td>62.0%</td></tr>
            </tbody></table>
        "#;
        let rows = parse_playoff_odds(page).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].home_team.as_deref(), Some("Yankees"));
        assert_eq!(rows[0].home_win_prob, Some(87.5));
        assert_eq!(rows[0].away_team.as_deref(), Some("Opponent"));
        assert_eq!(rows[0].away_win_prob, None);
    }

    #[test]
    fn missing_playoff_table_is_a_parse_failure() {
        assert!(matches!(
            parse_playoff_odds("<html></html>"),
            Err(SourceError::Parse(_))
        ));
    }
}
