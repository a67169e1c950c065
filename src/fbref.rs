//! FBref static pages: season fixtures and per-match team statistics.
//!
//! Fixture lists come from the "Scores and Fixtures" table, which FBref
//! sometimes ships inside an HTML comment. Team statistics are read from the
//! `#team_stats` table and the `#team_stats_extra` blocks of a match report
//! and flattened into long rows (one value per stat, team and table).

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::parse_var;
use crate::error::FetchError;
use crate::export::{CsvRecord, write_csv};
use crate::http_client::{HttpTransport, Transport};
use crate::rate_limit::{FixedDelay, RateLimit};

pub const FBREF_BASE: &str = "https://fbref.com";
const DEFAULT_REQUEST_DELAY_MS: u64 = 3_000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

pub fn build_fixture_url(competition_id: u32, season_slug: &str, league_name: &str) -> String {
    format!(
        "{FBREF_BASE}/en/comps/{competition_id}/{season_slug}/schedule/{season_slug}-{league_name}-Scores-and-Fixtures"
    )
}

/// The match id segment of a match report URL:
/// `https://fbref.com/en/matches/3a6836b4/...` gives `3a6836b4`.
pub fn extract_match_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?;
    match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some("matches"), Some(id)) if !id.is_empty() => Some(id.to_string()),
        _ => None,
    }
}

/// One row of a season's "Scores and Fixtures" table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FbrefFixture {
    pub gameweek: String,
    pub day: String,
    pub date: String,
    pub start_time: String,
    pub home_team: String,
    pub home_xg: String,
    pub score: String,
    pub away_xg: String,
    pub away_team: String,
    pub attendance: String,
    pub venue: String,
    pub referee: String,
    pub match_url: Option<String>,
}

impl CsvRecord for FbrefFixture {
    const HEADER: &'static [&'static str] = &[
        "gameweek",
        "day",
        "date",
        "start_time",
        "home_team",
        "home_xg",
        "score",
        "away_xg",
        "away_team",
        "attendance",
        "venue",
        "referee",
        "match_url",
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatTable {
    Main,
    Extra,
}

/// One statistic of a match in home/away columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamStatLine {
    pub stat: String,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTeamStats {
    pub home: String,
    pub away: String,
    pub main: Vec<TeamStatLine>,
    pub extra: Vec<TeamStatLine>,
}

/// Long-format statistic: one value for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongStatRow {
    pub stat: String,
    pub team: String,
    pub value: String,
    pub table: StatTable,
    pub match_id: String,
}

impl CsvRecord for LongStatRow {
    const HEADER: &'static [&'static str] = &["stat", "team", "value", "table", "match_id"];
}

impl MatchTeamStats {
    /// Home values of every stat first, then away values, main table before extra.
    pub fn melt(&self, match_id: &str) -> Vec<LongStatRow> {
        let mut out = Vec::with_capacity(2 * (self.main.len() + self.extra.len()));
        for (table, lines) in [(StatTable::Main, &self.main), (StatTable::Extra, &self.extra)] {
            for (team, home_side) in [(&self.home, true), (&self.away, false)] {
                for line in lines {
                    out.push(LongStatRow {
                        stat: line.stat.clone(),
                        team: team.clone(),
                        value: if home_side {
                            line.home.clone()
                        } else {
                            line.away.clone()
                        },
                        table,
                        match_id: match_id.to_string(),
                    });
                }
            }
        }
        out
    }
}

/// Parses the fixtures table of a schedule page. `None` when the page has
/// neither a plain nor a commented-out fixtures table.
pub fn parse_fixtures(html: &str) -> Result<Option<Vec<FbrefFixture>>, FetchError> {
    let table_sel = selector("table")?;
    let document = Html::parse_document(html);
    if let Some(table) = document.select(&table_sel).next() {
        return fixture_rows(table).map(Some);
    }

    let Some(commented) = extract_commented_table(&document) else {
        return Ok(None);
    };
    let fragment = Html::parse_fragment(&commented);
    fragment.select(&table_sel).next().map(fixture_rows).transpose()
}

/// Markup of the first HTML comment that holds the fixtures table.
pub fn extract_commented_table(document: &Html) -> Option<String> {
    document.tree.nodes().find_map(|node| match node.value() {
        Node::Comment(c)
            if c.comment.contains("table") && c.comment.contains("Scores and Fixtures") =>
        {
            Some(c.comment.to_string())
        }
        _ => None,
    })
}

fn fixture_rows(table: ElementRef<'_>) -> Result<Vec<FbrefFixture>, FetchError> {
    let row_sel = selector("tbody tr")?;
    let cell_sel = selector("th[data-stat], td[data-stat]")?;
    let report_sel = selector(r#"td[data-stat="match_report"] a[href]"#)?;

    let mut out = Vec::new();
    for row in table.select(&row_sel) {
        if row.value().classes().any(|c| c == "thead" || c == "spacer") {
            continue;
        }
        let cells = row
            .select(&cell_sel)
            .filter_map(|cell| {
                let stat = cell.value().attr("data-stat")?;
                Some((stat, stripped_text(cell)))
            })
            .collect::<Vec<_>>();
        let cell = |stat: &str| {
            cells
                .iter()
                .find(|(s, _)| *s == stat)
                .map(|(_, text)| text.clone())
                .unwrap_or_default()
        };

        let date = cell("date");
        if date.is_empty() {
            continue;
        }
        let match_url = row
            .select(&report_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .filter(|href| href.starts_with("/en/matches/"))
            .map(|href| format!("{FBREF_BASE}{href}"));

        out.push(FbrefFixture {
            gameweek: cell("gameweek"),
            day: cell("dayofweek"),
            date,
            start_time: cell("start_time"),
            home_team: cell("home_team"),
            home_xg: cell("home_xg"),
            score: cell("score"),
            away_xg: cell("away_xg"),
            away_team: cell("away_team"),
            attendance: cell("attendance"),
            venue: cell("venue"),
            referee: cell("referee"),
            match_url,
        });
    }
    Ok(out)
}

/// Reads `#team_stats`: a header row naming both teams, then pairs of rows
/// (stat name, then home and away values).
pub fn parse_team_stats(
    url: &str,
    html: &str,
) -> Result<(Vec<TeamStatLine>, String, String), FetchError> {
    let document = Html::parse_document(html);
    let table_sel = selector("#team_stats table")?;
    let fallback_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;

    let table = document
        .select(&table_sel)
        .next()
        .or_else(|| document.select(&fallback_sel).next())
        .ok_or_else(|| decode_error(url, "team stats table not found"))?;
    let rows = table.select(&row_sel).collect::<Vec<_>>();
    let header = rows
        .first()
        .ok_or_else(|| decode_error(url, "team stats table has no rows"))?;

    let team_in_header = |align: &str| {
        header
            .select(&th_sel)
            .find(|th| {
                th.value()
                    .attr("style")
                    .is_some_and(|s| s.contains(&format!("text-align: {align}")))
            })
            .map(stripped_text)
    };
    let home = team_in_header("right").ok_or_else(|| decode_error(url, "home team missing"))?;
    let away = team_in_header("left").ok_or_else(|| decode_error(url, "away team missing"))?;

    let mut lines = Vec::new();
    for pair in rows[1..].chunks(2) {
        let [label, values] = pair else {
            continue;
        };
        let Some(th) = label.select(&th_sel).next() else {
            continue;
        };
        let tds = values.select(&td_sel).collect::<Vec<_>>();
        if tds.len() < 2 {
            debug!(stat = %stripped_text(th), "team stat without two values");
            continue;
        }
        lines.push(TeamStatLine {
            stat: stripped_text(th),
            home: spaced_text(tds[0]),
            away: spaced_text(tds[1]),
        });
    }
    Ok((lines, home, away))
}

/// Reads `#team_stats_extra`: each block lists `home value, stat, away value`
/// triples after its team-name header cells.
pub fn parse_team_stats_extra(html: &str) -> Result<Vec<TeamStatLine>, FetchError> {
    let document = Html::parse_document(html);
    let container_sel = selector("#team_stats_extra")?;
    let Some(container) = document.select(&container_sel).next() else {
        return Ok(Vec::new());
    };

    let mut lines = Vec::new();
    for block in child_divs(container) {
        let values = child_divs(block)
            .filter(|div| !div.value().classes().any(|c| c == "th"))
            .map(stripped_text)
            .collect::<Vec<_>>();
        for triple in values.chunks_exact(3) {
            lines.push(TeamStatLine {
                stat: triple[1].clone(),
                home: triple[0].clone(),
                away: triple[2].clone(),
            });
        }
    }
    Ok(lines)
}

/// Both stat sections of a match report page.
pub fn parse_match_team_stats(url: &str, html: &str) -> Result<MatchTeamStats, FetchError> {
    let (main, home, away) = parse_team_stats(url, html)?;
    let extra = parse_team_stats_extra(html)?;
    Ok(MatchTeamStats {
        home,
        away,
        main,
        extra,
    })
}

/// Concatenates every per-match long CSV in `dir` (sorted by file name) into `out`.
pub fn combine_long_stats(dir: &Path, out: &Path) -> Result<usize, FetchError> {
    let mut files = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect::<Vec<_>>();
    files.sort();

    let mut rows = Vec::new();
    for file in &files {
        let mut reader = csv::Reader::from_path(file)?;
        for row in reader.deserialize::<LongStatRow>() {
            rows.push(row?);
        }
    }
    write_csv(out, &rows)?;
    info!(files = files.len(), rows = rows.len(), "combined match stats");
    Ok(rows.len())
}

pub struct FbrefClient<T, R> {
    transport: T,
    rate_limit: R,
}

impl FbrefClient<HttpTransport, FixedDelay> {
    /// Reads `FBREF_REQUEST_DELAY_MS` (default 3000, at most 60000) and
    /// `HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, FetchError> {
        let var = |key: &str| std::env::var(key).ok();
        let delay_ms = parse_var::<u64>(var, "FBREF_REQUEST_DELAY_MS")
            .unwrap_or(DEFAULT_REQUEST_DELAY_MS)
            .clamp(0, 60_000);
        let timeout_secs = parse_var::<u64>(var, "HTTP_TIMEOUT_SECS")
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
            .clamp(1, 120);
        Ok(Self::new(
            HttpTransport::new(Duration::from_secs(timeout_secs))?,
            FixedDelay(Duration::from_millis(delay_ms)),
        ))
    }
}

impl<T: Transport, R: RateLimit> FbrefClient<T, R> {
    pub fn new(transport: T, rate_limit: R) -> Self {
        Self {
            transport,
            rate_limit,
        }
    }

    /// Fixtures of one competition season. Empty when the page carries no
    /// fixtures table.
    pub fn fetch_fixtures(
        &self,
        competition_id: u32,
        season_slug: &str,
        league_name: &str,
    ) -> Result<Vec<FbrefFixture>, FetchError> {
        let url = build_fixture_url(competition_id, season_slug, league_name);
        self.rate_limit.wait_before_next_call();
        let html = self.transport.get_text(&url, &[])?;
        match parse_fixtures(&html)? {
            Some(fixtures) => {
                debug!(url, fixtures = fixtures.len(), "parsed fixtures");
                Ok(fixtures)
            }
            None => {
                warn!(url, "no fixtures table on page");
                Ok(Vec::new())
            }
        }
    }

    /// Team statistics of one match report, in long format.
    pub fn fetch_match_stats(&self, match_url: &str) -> Result<Vec<LongStatRow>, FetchError> {
        let match_id = extract_match_id(match_url)
            .ok_or_else(|| decode_error(match_url, "not a match report url"))?;
        self.rate_limit.wait_before_next_call();
        let html = self.transport.get_text(match_url, &[])?;
        let stats = parse_match_team_stats(match_url, &html)?;
        Ok(stats.melt(&match_id))
    }
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|err| FetchError::Config(format!("bad selector {css}: {err:?}")))
}

fn child_divs<'a>(parent: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "div")
}

fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect::<String>()
}

fn spaced_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_error(url: &str, message: &str) -> FetchError {
    FetchError::Decode {
        url: url.to_string(),
        message: message.to_string(),
    }
}
