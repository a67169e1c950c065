//! Keyed client for the API-Football v3 REST API.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::config::parse_var;
use crate::error::FetchError;
use crate::export::CsvRecord;
use crate::http_client::{HttpTransport, Transport, decode_json};

pub const API_FOOTBALL_BASE: &str = "https://v3.football.api-sports.io";
pub const API_KEY_HEADER: &str = "x-apisports-key";
const DEFAULT_KEY_FILE: &str = "config/api_keys.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ApiFootballConfig {
    pub api_key: String,
    pub http_timeout: Duration,
}

impl ApiFootballConfig {
    pub fn from_env() -> Result<Self, FetchError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// The key comes from `API_FOOTBALL_KEY`, else from the `api_football_key`
    /// field of the JSON file named by `API_FOOTBALL_KEY_FILE`
    /// (default `config/api_keys.json`).
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, FetchError> {
        let api_key = match var("API_FOOTBALL_KEY").map(|k| k.trim().to_string()) {
            Some(key) if !key.is_empty() => key,
            _ => {
                let path = var("API_FOOTBALL_KEY_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE));
                load_key_file(&path)?
            }
        };
        let timeout_secs = parse_var::<u64>(&var, "HTTP_TIMEOUT_SECS")
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
            .clamp(1, 120);
        Ok(Self {
            api_key,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Deserialize)]
struct KeyFile {
    #[serde(default)]
    api_football_key: String,
}

pub fn load_key_file(path: &Path) -> Result<String, FetchError> {
    let text = fs::read_to_string(path).map_err(|err| {
        FetchError::Config(format!(
            "API-Football key not set and {} unreadable: {err}",
            path.display()
        ))
    })?;
    let file: KeyFile = serde_json::from_str(&text)
        .map_err(|err| FetchError::Config(format!("{}: {err}", path.display())))?;
    let key = file.api_football_key.trim().to_string();
    if key.is_empty() {
        return Err(FetchError::Config(format!(
            "{} has no api_football_key",
            path.display()
        )));
    }
    Ok(key)
}

#[derive(Debug, Clone)]
pub struct SeasonFixtures {
    /// The full response body, kept for archiving.
    pub raw: Value,
    pub fixtures: Vec<ApiFixtureRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiFixtureRow {
    pub fixture_id: i64,
    pub date: String,
    pub round: String,
    pub status: String,
    pub venue: String,
    pub home_id: i64,
    pub home_team: String,
    pub away_id: i64,
    pub away_team: String,
    pub home_goals: Option<i64>,
    pub away_goals: Option<i64>,
}

impl CsvRecord for ApiFixtureRow {
    const HEADER: &'static [&'static str] = &[
        "fixture_id",
        "date",
        "round",
        "status",
        "venue",
        "home_id",
        "home_team",
        "away_id",
        "away_team",
        "home_goals",
        "away_goals",
    ];
}

#[derive(Debug, Deserialize)]
struct FixtureItem {
    fixture: FixtureInfo,
    #[serde(default)]
    league: FixtureLeague,
    teams: Teams,
    #[serde(default)]
    goals: Goals,
}

#[derive(Debug, Deserialize)]
struct FixtureInfo {
    id: i64,
    #[serde(default)]
    date: String,
    #[serde(default)]
    venue: Named,
    #[serde(default)]
    status: Status,
}

#[derive(Debug, Default, Deserialize)]
struct FixtureLeague {
    #[serde(default)]
    round: String,
}

#[derive(Debug, Default, Deserialize)]
struct Named {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Status {
    #[serde(default)]
    short: String,
}

#[derive(Debug, Deserialize)]
struct Teams {
    home: Team,
    away: Team,
}

#[derive(Debug, Deserialize)]
struct Team {
    id: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Goals {
    home: Option<i64>,
    away: Option<i64>,
}

/// A league and the season years the API covers for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiLeague {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub seasons: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct LeagueItem {
    league: LeagueInfo,
    #[serde(default)]
    country: Named,
    #[serde(default)]
    seasons: Vec<SeasonYear>,
}

#[derive(Debug, Deserialize)]
struct LeagueInfo {
    id: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SeasonYear {
    year: i64,
}

pub struct ApiFootballClient<T> {
    transport: T,
}

impl ApiFootballClient<HttpTransport> {
    pub fn from_config(config: &ApiFootballConfig) -> Result<Self, FetchError> {
        let transport =
            HttpTransport::new(config.http_timeout)?.with_header(API_KEY_HEADER, &config.api_key)?;
        Ok(Self::new(transport))
    }
}

impl<T: Transport> ApiFootballClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let url = format!("{API_FOOTBALL_BASE}/{endpoint}");
        let body = self.transport.get_text(&url, query)?;
        let raw: Value = decode_json(&url, &body)?;
        // `errors` is `[]` on success and an object or list of messages otherwise.
        if let Some(message) = raw.get("errors").and_then(provider_errors) {
            return Err(FetchError::Provider { url, message });
        }
        Ok(raw)
    }

    /// Every fixture of a league season, e.g. league 39 (Premier League), season 2023.
    pub fn fetch_fixtures(&self, league_id: u32, season: u16) -> Result<SeasonFixtures, FetchError> {
        let query = [("league", league_id.to_string()), ("season", season.to_string())];
        let raw = self.get("fixtures", &query)?;
        let fixtures = parse_fixtures(&raw)?;
        info!(league_id, season, matches = fixtures.len(), "matches obtained");
        Ok(SeasonFixtures { raw, fixtures })
    }

    pub fn fetch_leagues(&self) -> Result<Vec<ApiLeague>, FetchError> {
        let raw = self.get("leagues", &[])?;
        parse_leagues(&raw)
    }
}

pub fn parse_fixtures(raw: &Value) -> Result<Vec<ApiFixtureRow>, FetchError> {
    let items: Vec<FixtureItem> = response_items(raw, "fixtures")?;
    Ok(items
        .into_iter()
        .map(|item| ApiFixtureRow {
            fixture_id: item.fixture.id,
            date: item.fixture.date,
            round: item.league.round,
            status: item.fixture.status.short,
            venue: item.fixture.venue.name.unwrap_or_default(),
            home_id: item.teams.home.id,
            home_team: item.teams.home.name,
            away_id: item.teams.away.id,
            away_team: item.teams.away.name,
            home_goals: item.goals.home,
            away_goals: item.goals.away,
        })
        .collect())
}

pub fn parse_leagues(raw: &Value) -> Result<Vec<ApiLeague>, FetchError> {
    let items: Vec<LeagueItem> = response_items(raw, "leagues")?;
    Ok(items
        .into_iter()
        .map(|item| ApiLeague {
            id: item.league.id,
            name: item.league.name,
            country: item.country.name.unwrap_or_default(),
            seasons: item.seasons.into_iter().map(|s| s.year).collect(),
        })
        .collect())
}

/// First league whose name and country match exactly.
pub fn find_league<'a>(leagues: &'a [ApiLeague], name: &str, country: &str) -> Option<&'a ApiLeague> {
    leagues
        .iter()
        .find(|l| l.name == name && l.country == country)
}

fn response_items<T: serde::de::DeserializeOwned>(raw: &Value, endpoint: &str) -> Result<Vec<T>, FetchError> {
    match raw.get("response") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(items) => serde_json::from_value(items.clone()).map_err(|err| FetchError::Decode {
            url: format!("{API_FOOTBALL_BASE}/{endpoint}"),
            message: err.to_string(),
        }),
    }
}

fn provider_errors(errors: &Value) -> Option<String> {
    match errors {
        Value::Object(map) if !map.is_empty() => Some(
            map.iter()
                .map(|(k, v)| format!("{k}: {}", v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string())))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Value::Array(items) if !items.is_empty() => Some(
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}
