// src/pipeline/sources/soccer_scores.rs
// FBref per-league schedule pages. The least reliable upstream in the set
// (HTML-scraped, aggressive anti-bot), so this is the one adapter wrapped in
// the retry/backoff policy.

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::config::SoccerLeague;
use crate::pipeline::pace::{RateLimiter, RetryPolicy};
use crate::pipeline::source::{get_text, RawScore, ScoreSource, SourceError, SourceOutcome};
use crate::schema::Sport;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table#sched_all").unwrap());
static ROWS: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody tr").unwrap());
static DATE_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"td[data-stat="date"]"#).unwrap());
static HOME_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"td[data-stat="home_team"]"#).unwrap());
static AWAY_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"td[data-stat="away_team"]"#).unwrap());
static SCORE_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"td[data-stat="score"]"#).unwrap());

pub struct SoccerScores {
    leagues: Vec<SoccerLeague>,
    retry: RetryPolicy,
    limiter: RateLimiter,
}

impl SoccerScores {
    pub fn new(leagues: Vec<SoccerLeague>, retry: RetryPolicy, limiter: RateLimiter) -> Self {
        Self {
            leagues,
            retry,
            limiter,
        }
    }
}

#[async_trait]
impl ScoreSource for SoccerScores {
    fn name(&self) -> &'static str {
        "soccer-fbref"
    }

    fn identity(&self) -> (Sport, &str) {
        (Sport::Soccer, "Soccer")
    }

    async fn fetch(&self, client: &reqwest::Client, date: NaiveDate) -> SourceOutcome<RawScore> {
        let mut records = Vec::new();
        let mut failed = 0usize;
        let mut last_cause = None;

        // One league's malformed table must not block the others.
        for league in &self.leagues {
            let attempt = self
                .retry
                .run(|| {
                    let url = league.scores_url.as_str();
                    let name = league.name.as_str();
                    async move {
                        let body = get_text(client, url).await?;
                        parse_scores_page(&body, name, date)
                    }
                })
                .await;

            match attempt {
                Ok(mut rows) => {
                    records.append(&mut rows);
                    self.limiter.courtesy().await;
                }
                Err(e) => {
                    tracing::warn!(league = %league.name, error = %e, "soccer league exhausted retries");
                    failed += 1;
                    last_cause = Some(e);
                }
            }
        }

        match (failed, last_cause) {
            (0, _) => SourceOutcome::Complete(records),
            (n, Some(cause)) if n == self.leagues.len() => SourceOutcome::Failed(cause),
            (_, Some(cause)) => SourceOutcome::Partial { records, cause },
            _ => SourceOutcome::Complete(records),
        }
    }
}

/// Extract score rows for one league page. Rows must carry both teams and a
/// date matching the query date; the score cell may legitimately be empty
/// (not yet played).
pub fn parse_scores_page(
    html: &str,
    league: &str,
    query_date: NaiveDate,
) -> Result<Vec<RawScore>, SourceError> {
    let doc = Html::parse_document(html);
    let table = doc
        .select(&TABLE)
        .next()
        .ok_or_else(|| SourceError::Parse("schedule table #sched_all missing".into()))?;

    let mut out = Vec::new();
    for row in table.select(&ROWS) {
        let classes = row.value().attr("class").unwrap_or("");
        if classes.contains("thead") || classes.contains("over_header") {
            continue;
        }

        let date = cell_text(&row, &DATE_CELL);
        let home = cell_text(&row, &HOME_CELL);
        let away = cell_text(&row, &AWAY_CELL);
        let score = cell_text(&row, &SCORE_CELL);

        let (Some(date), Some(home), Some(away)) = (date, home, away) else {
            continue;
        };
        if home.is_empty() || away.is_empty() {
            continue;
        }
        // Rows whose date cell does not parse are dropped rather than guessed.
        let Ok(row_date) = NaiveDate::parse_from_str(&date, "%Y-%m-%d") else {
            continue;
        };
        if row_date != query_date {
            continue;
        }

        out.push(RawScore {
            sport: Sport::Soccer,
            league: league.to_string(),
            date: Some(date),
            home_team: Some(home),
            away_team: Some(away),
            score,
        });
    }
    Ok(out)
}

fn cell_text(row: &ElementRef<'_>, sel: &Selector) -> Option<String> {
    row.select(sel)
        .next()
        .map(|c| c.text().collect::<String>().trim().to_string())
}
