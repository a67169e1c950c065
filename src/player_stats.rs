use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::export::CsvRecord;
use crate::http_client::{Transport, decode_json};
use crate::leagues::LeagueConfig;
use crate::rate_limit::RateLimit;
use crate::scores365::Scores365Client;

const STATS_PATH: &str = "stats";

/// One leaderboard entry: a player and their value for one statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStatRow {
    pub player_id: i64,
    pub player_name: String,
    pub position_name: String,
    pub value: String,
    pub stat: String,
}

impl CsvRecord for PlayerStatRow {
    const HEADER: &'static [&'static str] =
        &["player_id", "player_name", "position_name", "value", "stat"];
}

#[derive(Debug, Default, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    stats: StatsBlock,
}

#[derive(Debug, Default, Deserialize)]
struct StatsBlock {
    #[serde(rename = "athletesStats", default)]
    athletes_stats: Vec<AthleteStat>,
}

#[derive(Debug, Deserialize)]
struct AthleteStat {
    #[serde(default)]
    name: String,
    #[serde(default)]
    rows: Vec<AthleteRow>,
}

#[derive(Debug, Deserialize)]
struct AthleteRow {
    entity: AthleteEntity,
    #[serde(default)]
    stats: Vec<StatValue>,
}

#[derive(Debug, Deserialize)]
struct AthleteEntity {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(rename = "positionName", default)]
    position_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatValue {
    #[serde(default)]
    value: Value,
}

impl<T: Transport, R: RateLimit> Scores365Client<T, R> {
    /// Top performers of every statistic the provider lists for `league`.
    pub fn fetch_top_player_stats(
        &self,
        league: &LeagueConfig,
    ) -> Result<Vec<PlayerStatRow>, FetchError> {
        let url = Self::endpoint(STATS_PATH);
        let mut query = self.competition_query(league);
        query.push(("competitors", String::new()));
        query.push(("withSeasons", "true".to_string()));

        let body = self.transport.get_text(&url, &query)?;
        let rows = parse_top_player_stats(&url, &body)?;
        if rows.is_empty() {
            info!(league = league.name, "no player statistics published");
        } else {
            debug!(league = league.name, rows = rows.len(), "parsed player statistics");
        }
        Ok(rows)
    }
}

pub fn parse_top_player_stats(url: &str, body: &str) -> Result<Vec<PlayerStatRow>, FetchError> {
    let parsed: StatsResponse = decode_json(url, body)?;
    let mut out = Vec::new();
    for stat in parsed.stats.athletes_stats {
        for row in stat.rows {
            let value = row
                .stats
                .first()
                .map(|s| stat_value_text(&s.value))
                .unwrap_or_default();
            out.push(PlayerStatRow {
                player_id: row.entity.id,
                player_name: row.entity.name,
                position_name: row.entity.position_name.unwrap_or_default(),
                value,
                stat: stat.name.clone(),
            });
        }
    }
    Ok(out)
}

fn stat_value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_each_leaderboard_row() {
        let body = r#"{"stats": {"athletesStats": [
            {"name": "Goals", "rows": [
                {"entity": {"id": 1, "name": "Haaland", "positionName": "Forward"}, "stats": [{"value": "14"}]},
                {"entity": {"id": 2, "name": "Salah"}, "stats": [{"value": 11}]}
            ]},
            {"name": "Assists", "rows": [
                {"entity": {"id": 2, "name": "Salah", "positionName": "Forward"}, "stats": []}
            ]}
        ]}}"#;
        let rows = parse_top_player_stats("u", body).expect("valid stats");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].value, "14");
        assert_eq!(rows[0].stat, "Goals");
        assert_eq!(rows[1].value, "11");
        assert_eq!(rows[1].position_name, "");
        assert_eq!(rows[2].stat, "Assists");
        assert_eq!(rows[2].value, "");
    }

    #[test]
    fn missing_stats_block_is_empty() {
        assert!(parse_top_player_stats("u", "{}").expect("empty").is_empty());
        assert!(parse_top_player_stats("u", "null").expect("null").is_empty());
    }
}
