// src/export.rs
// CSV snapshot export. A boundary-side collaborator: it consumes an already
// aggregated snapshot and writes files, and the pipeline never calls it.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::schema::{Event, Fixture, Prediction, Sport};

pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `all_scores.csv` plus one `<sport>_scores.csv` per sport present.
    /// Returns the paths written.
    pub fn export_scores(&self, events: &[Event]) -> io::Result<Vec<PathBuf>> {
        self.export(
            "scores",
            events,
            &["sport", "league", "date", "home_team", "away_team", "score"],
            |e| {
                vec![
                    e.sport.as_str().to_string(),
                    e.league.clone(),
                    e.date.clone(),
                    e.home_team.clone(),
                    e.away_team.clone(),
                    e.score.clone(),
                ]
            },
            |e| e.sport,
        )
    }

    pub fn export_fixtures(&self, fixtures: &[Fixture]) -> io::Result<Vec<PathBuf>> {
        self.export(
            "fixtures",
            fixtures,
            &[
                "sport", "league", "date", "time", "home_team", "away_team", "status", "note",
            ],
            |f| {
                vec![
                    f.sport.as_str().to_string(),
                    f.league.clone(),
                    f.date.clone(),
                    f.time.clone(),
                    f.home_team.clone(),
                    f.away_team.clone(),
                    f.status.clone(),
                    f.note.clone().unwrap_or_default(),
                ]
            },
            |f| f.sport,
        )
    }

    pub fn export_predictions(&self, predictions: &[Prediction]) -> io::Result<Vec<PathBuf>> {
        self.export(
            "predictions",
            predictions,
            &[
                "sport",
                "league",
                "home_team",
                "away_team",
                "home_win_prob",
                "draw_prob",
                "away_win_prob",
            ],
            |p| {
                vec![
                    p.sport.as_str().to_string(),
                    p.league.clone(),
                    p.home_team.clone(),
                    p.away_team.clone(),
                    prob_cell(p.home_win_prob),
                    prob_cell(p.draw_prob),
                    prob_cell(p.away_win_prob),
                ]
            },
            |p| p.sport,
        )
    }

    fn export<T>(
        &self,
        pipeline: &str,
        records: &[T],
        header: &[&str],
        to_row: impl Fn(&T) -> Vec<String>,
        sport_of: impl Fn(&T) -> Sport,
    ) -> io::Result<Vec<PathBuf>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        fs::create_dir_all(&self.dir)?;

        let mut written = Vec::new();
        let all = self.dir.join(format!("all_{pipeline}.csv"));
        write_csv(&all, header, records.iter().map(&to_row))?;
        written.push(all);

        let mut sports: Vec<Sport> = Vec::new();
        for r in records {
            let s = sport_of(r);
            if !sports.contains(&s) {
                sports.push(s);
            }
        }
        for sport in sports {
            let path = self
                .dir
                .join(format!("{}_{pipeline}.csv", sport.as_str().to_lowercase()));
            let rows = records
                .iter()
                .filter(|r| sport_of(r) == sport)
                .map(&to_row);
            write_csv(&path, header, rows)?;
            written.push(path);
        }
        Ok(written)
    }
}

fn prob_cell(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.1}")).unwrap_or_default()
}

fn write_csv(
    path: &Path,
    header: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> io::Result<()> {
    let mut buf: Vec<u8> = Vec::new();
    let header_row: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    write_row(&mut buf, &header_row)?;
    for row in rows {
        write_row(&mut buf, &row)?;
    }
    fs::write(path, buf)
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row with minimal quoting.
fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{escaped}\"")?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}
