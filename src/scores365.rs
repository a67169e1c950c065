//! Client for the 365Scores web API (`webws.365scores.com`).
//!
//! The endpoints are the ones the public website calls; their JSON is an
//! external contract, so every response is decoded into the handful of
//! fields this crate actually reads. Operations live next to their row
//! types: [`crate::schedule_fetch`], [`crate::today_games`] and
//! [`crate::player_stats`].

use crate::config::Scores365Config;
use crate::error::FetchError;
use crate::http_client::{HttpTransport, Transport};
use crate::leagues::LeagueConfig;
use crate::rate_limit::{FixedDelay, RateLimit};

pub const SCORES365_API_BASE: &str = "https://webws.365scores.com/web";

#[derive(Debug, Clone)]
pub struct Scores365Client<T, R> {
    pub(crate) transport: T,
    pub(crate) rate_limit: R,
    pub(crate) config: Scores365Config,
}

impl Scores365Client<HttpTransport, FixedDelay> {
    pub fn from_config(config: Scores365Config) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(config.http_timeout)?;
        let rate_limit = FixedDelay(config.request_delay);
        Ok(Self::new(transport, rate_limit, config))
    }
}

impl<T: Transport, R: RateLimit> Scores365Client<T, R> {
    pub fn new(transport: T, rate_limit: R, config: Scores365Config) -> Self {
        Self {
            transport,
            rate_limit,
            config,
        }
    }

    pub fn config(&self) -> &Scores365Config {
        &self.config
    }

    pub(crate) fn endpoint(path: &str) -> String {
        format!("{SCORES365_API_BASE}/{path}/")
    }

    /// Common params plus the competition filter for `league`.
    pub(crate) fn competition_query(&self, league: &LeagueConfig) -> Vec<(&'static str, String)> {
        let mut query = self.config.base_query();
        query.push(("competitions", league.numeric_id.to_string()));
        query
    }
}
