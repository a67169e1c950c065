use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::RoundFailurePolicy;
use crate::error::FetchError;
use crate::http_client::{Transport, decode_json};
use crate::leagues::LeagueConfig;
use crate::normalize::{NormalizedRow, RawGame, normalize};
use crate::rate_limit::RateLimit;
use crate::scores365::Scores365Client;

const RESULTS_PATH: &str = "games/results";

#[derive(Debug, Clone, Default)]
pub struct SeasonGames {
    pub games: Vec<RawGame>,
    pub rounds_total: usize,
    pub rounds_fetched: usize,
    pub errors: Vec<String>,
}

impl SeasonGames {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty() && self.rounds_fetched == self.rounds_total
    }
}

#[derive(Debug, Clone)]
pub struct SeasonSchedule {
    pub rows: Vec<NormalizedRow>,
    pub rounds_total: usize,
    pub rounds_fetched: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultsPage {
    #[serde(rename = "lastUpdateId", default)]
    last_update_id: Option<Value>,
    #[serde(default)]
    rounds: Vec<RoundFilter>,
    #[serde(default)]
    games: Vec<RawGame>,
}

#[derive(Debug, Deserialize)]
struct RoundFilter {
    #[serde(default)]
    key: Value,
}

impl ResultsPage {
    // The empty key is the provider's "all rounds" aggregate.
    fn round_keys(&self) -> Vec<String> {
        self.rounds
            .iter()
            .filter_map(|r| scalar_to_string(&r.key))
            .filter(|k| !k.is_empty())
            .collect()
    }

    fn snapshot_token(&self) -> Option<String> {
        self.last_update_id.as_ref().and_then(scalar_to_string)
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl<T: Transport, R: RateLimit> Scores365Client<T, R> {
    /// Pages through every round of the current season of `league`.
    ///
    /// One discovery request, then one request per non-empty round key, all
    /// pinned to the discovery response's `lastUpdateId`.
    pub fn fetch_all_rounds(&self, league: &LeagueConfig) -> Result<SeasonGames, FetchError> {
        let url = Self::endpoint(RESULTS_PATH);
        let query = self.competition_query(league);

        let body = self.transport.get_text(&url, &query)?;
        let discovery: ResultsPage = decode_json(&url, &body)?;
        let round_keys = discovery.round_keys();
        if round_keys.is_empty() {
            info!(league = league.name, "no rounds listed for competition");
            return Ok(SeasonGames::default());
        }
        let token = discovery.snapshot_token().ok_or_else(|| FetchError::Decode {
            url: url.clone(),
            message: "missing lastUpdateId".to_string(),
        })?;
        info!(
            league = league.name,
            rounds = round_keys.len(),
            last_update_id = %token,
            "discovered season rounds"
        );

        let mut out = SeasonGames {
            rounds_total: round_keys.len(),
            ..SeasonGames::default()
        };
        for key in &round_keys {
            self.rate_limit.wait_before_next_call();
            match self.fetch_round(&url, &query, &token, key) {
                Ok(games) => {
                    debug!(round = %key, games = games.len(), "fetched round");
                    out.rounds_fetched += 1;
                    out.games.extend(games);
                }
                Err(err) => match self.config.on_round_failure {
                    RoundFailurePolicy::Abort => return Err(err),
                    RoundFailurePolicy::KeepPartial => {
                        warn!(round = %key, error = %err, "round fetch failed, keeping partial results");
                        out.errors.push(format!("round {key}: {err}"));
                    }
                },
            }
        }

        if out.games.is_empty() {
            info!(league = league.name, "season listing returned no games");
        }
        Ok(out)
    }

    /// Fetches and normalizes the whole season schedule of `league`.
    pub fn fetch_season_schedule(&self, league: &LeagueConfig) -> Result<SeasonSchedule, FetchError> {
        let season = self.fetch_all_rounds(league)?;
        let rows = normalize(&season.games, league)?;
        Ok(SeasonSchedule {
            rows,
            rounds_total: season.rounds_total,
            rounds_fetched: season.rounds_fetched,
            errors: season.errors,
        })
    }

    fn fetch_round(
        &self,
        url: &str,
        base_query: &[(&'static str, String)],
        token: &str,
        round: &str,
    ) -> Result<Vec<RawGame>, FetchError> {
        let mut query = base_query.to_vec();
        query.push(("lastUpdateId", token.to_string()));
        query.push(("round", round.to_string()));
        let body = self.transport.get_text(url, &query)?;
        let page: ResultsPage = decode_json(url, &body)?;
        Ok(page.games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_keys_skip_aggregate_and_accept_numbers() {
        let page: ResultsPage = serde_json::from_str(
            r#"{"lastUpdateId": 5087, "rounds": [{"key": ""}, {"key": 1}, {"key": "2"}, {"name": "x"}]}"#,
        )
        .expect("valid json");
        assert_eq!(page.round_keys(), vec!["1".to_string(), "2".to_string()]);
        assert_eq!(page.snapshot_token().as_deref(), Some("5087"));
    }

    #[test]
    fn season_games_completeness() {
        let mut season = SeasonGames {
            rounds_total: 2,
            rounds_fetched: 2,
            ..SeasonGames::default()
        };
        assert!(season.is_complete());
        season.errors.push("round 2: boom".to_string());
        assert!(!season.is_complete());
    }
}
