use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::export::CsvRecord;
use crate::leagues::LeagueConfig;

pub const MATCH_URL_BASE: &str = "https://www.365scores.com/es/football/match";

/// One game exactly as the provider returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawGame(pub Value);

impl RawGame {
    pub fn match_id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Competitor {
    pub name: String,
    pub id: i64,
    pub name_for_url: String,
}

/// The subset of a provider game record this crate consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub id: i64,
    pub start_time: DateTime<FixedOffset>,
    pub round_num: Option<i64>,
    pub round_name: String,
    pub home: Competitor,
    pub away: Competitor,
}

impl GameRecord {
    pub fn from_raw(raw: &RawGame) -> Result<Self, FetchError> {
        let v = &raw.0;
        let match_id = raw.match_id();
        let id = require_i64(v, "id", "id", match_id)?;
        let start_time = start_time(raw)?;

        Ok(Self {
            id,
            start_time,
            round_num: parse_round_num(v.get("roundNum")),
            round_name: v
                .get("roundName")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            home: competitor(v, "homeCompetitor", match_id)?,
            away: competitor(v, "awayCompetitor", match_id)?,
        })
    }

    pub fn into_row(self, league: &LeagueConfig) -> NormalizedRow {
        let match_url = match_url(league, &self.home, &self.away, self.id);
        NormalizedRow {
            round_num: self.round_num,
            round_name: self.round_name,
            match_date: self.start_time.date_naive(),
            start_time: self.start_time.time(),
            home_team: self.home.name,
            away_team: self.away.name,
            home_id: self.home.id,
            away_id: self.away.id,
            league_id: league.numeric_id,
            match_id: self.id,
            match_url,
            kickoff: self.start_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    pub round_num: Option<i64>,
    pub round_name: String,
    pub match_date: NaiveDate,
    #[serde(serialize_with = "serialize_hh_mm")]
    pub start_time: NaiveTime,
    pub home_team: String,
    pub away_team: String,
    pub home_id: i64,
    pub away_id: i64,
    pub league_id: u32,
    pub match_id: i64,
    pub match_url: String,
    #[serde(skip)]
    pub kickoff: DateTime<FixedOffset>,
}

impl CsvRecord for NormalizedRow {
    const HEADER: &'static [&'static str] = &[
        "round_num",
        "round_name",
        "match_date",
        "start_time",
        "home_team",
        "away_team",
        "home_id",
        "away_id",
        "league_id",
        "match_id",
        "match_url",
    ];
}

pub fn match_url(league: &LeagueConfig, home: &Competitor, away: &Competitor, match_id: i64) -> String {
    format!(
        "{MATCH_URL_BASE}/{slug}-{league_id}/{home_slug}-{away_slug}-{home_id}-{away_id}-{league_id}#id={match_id}",
        slug = league.url_slug,
        league_id = league.numeric_id,
        home_slug = home.name_for_url,
        away_slug = away.name_for_url,
        home_id = home.id,
        away_id = away.id,
    )
}

/// Flattens provider games into rows ordered by round then kickoff.
///
/// The first record missing a consumed field aborts the whole batch.
pub fn normalize(raw_games: &[RawGame], league: &LeagueConfig) -> Result<Vec<NormalizedRow>, FetchError> {
    if raw_games.is_empty() {
        info!(league = league.name, "no games to normalize");
        return Ok(Vec::new());
    }

    let mut rows = raw_games
        .iter()
        .map(|raw| GameRecord::from_raw(raw).map(|game| game.into_row(league)))
        .collect::<Result<Vec<_>, _>>()?;
    sort_rows(&mut rows);

    debug!(league = league.name, rows = rows.len(), "normalized games");
    Ok(rows)
}

/// Stable: rows with equal keys keep their relative order.
pub fn sort_rows(rows: &mut [NormalizedRow]) {
    rows.sort_by(|a, b| {
        round_order(a.round_num, b.round_num).then_with(|| a.kickoff.cmp(&b.kickoff))
    });
}

// Unknown rounds sort after every known one.
fn round_order(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Kickoff of a provider game, keeping the offset the provider sent.
pub fn start_time(raw: &RawGame) -> Result<DateTime<FixedOffset>, FetchError> {
    let match_id = raw.match_id();
    let start_raw = require_str(&raw.0, "startTime", "startTime", match_id)?;
    DateTime::parse_from_rfc3339(start_raw).map_err(|_| FetchError::MalformedRecord {
        field: "startTime".to_string(),
        detail: format!("is not an ISO-8601 timestamp: {start_raw}"),
        match_id,
    })
}

fn parse_round_num(v: Option<&Value>) -> Option<i64> {
    match v? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn competitor(v: &Value, key: &str, match_id: Option<i64>) -> Result<Competitor, FetchError> {
    let side = present(v, key).ok_or_else(|| FetchError::missing(key, match_id))?;
    Ok(Competitor {
        name: require_str(side, "name", &format!("{key}.name"), match_id)?.to_string(),
        id: require_i64(side, "id", &format!("{key}.id"), match_id)?,
        name_for_url: require_str(side, "nameForURL", &format!("{key}.nameForURL"), match_id)?
            .to_string(),
    })
}

fn present<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    v.get(key).filter(|x| !x.is_null())
}

fn require_str<'a>(
    v: &'a Value,
    key: &str,
    field: &str,
    match_id: Option<i64>,
) -> Result<&'a str, FetchError> {
    let value = present(v, key).ok_or_else(|| FetchError::missing(field, match_id))?;
    value.as_str().ok_or_else(|| FetchError::MalformedRecord {
        field: field.to_string(),
        detail: "is not a string".to_string(),
        match_id,
    })
}

fn require_i64(v: &Value, key: &str, field: &str, match_id: Option<i64>) -> Result<i64, FetchError> {
    let value = present(v, key).ok_or_else(|| FetchError::missing(field, match_id))?;
    value.as_i64().ok_or_else(|| FetchError::MalformedRecord {
        field: field.to_string(),
        detail: "is not an integer".to_string(),
        match_id,
    })
}

fn serialize_hh_mm<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format("%H:%M"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn round_num_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_round_num(Some(&json!(3))), Some(3));
        assert_eq!(parse_round_num(Some(&json!(" 12 "))), Some(12));
        assert_eq!(parse_round_num(Some(&json!(""))), None);
        assert_eq!(parse_round_num(Some(&json!("Final"))), None);
        assert_eq!(parse_round_num(None), None);
    }

    #[test]
    fn unknown_round_sorts_last() {
        assert_eq!(round_order(Some(38), None), Ordering::Less);
        assert_eq!(round_order(None, Some(1)), Ordering::Greater);
        assert_eq!(round_order(None, None), Ordering::Equal);
    }

    #[test]
    fn nested_missing_field_is_qualified() {
        let raw = RawGame(json!({
            "id": 9,
            "startTime": "2024-08-16T19:00:00+00:00",
            "homeCompetitor": {"name": "A", "id": 1, "nameForURL": "a"},
            "awayCompetitor": {"name": "B", "id": 2}
        }));
        let err = GameRecord::from_raw(&raw).unwrap_err();
        match err {
            FetchError::MalformedRecord { field, match_id, .. } => {
                assert_eq!(field, "awayCompetitor.nameForURL");
                assert_eq!(match_id, Some(9));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn start_time_keeps_provider_offset() {
        let raw = RawGame(json!({
            "id": 1,
            "startTime": "2024-08-16T23:30:00-05:00",
            "homeCompetitor": {"name": "A", "id": 1, "nameForURL": "a"},
            "awayCompetitor": {"name": "B", "id": 2, "nameForURL": "b"}
        }));
        let game = GameRecord::from_raw(&raw).expect("valid record");
        assert_eq!(game.start_time.date_naive().to_string(), "2024-08-16");
        assert_eq!(game.start_time.time().format("%H:%M").to_string(), "23:30");
    }
}
