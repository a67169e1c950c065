use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::FetchError;
use crate::export::CsvRecord;
use crate::http_client::{Transport, decode_json};
use crate::leagues::LeagueConfig;
use crate::normalize::{GameRecord, RawGame, match_url, start_time};
use crate::rate_limit::RateLimit;
use crate::scores365::Scores365Client;

const GAMES_PATH: &str = "games";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodayGame {
    pub home_team: String,
    pub away_team: String,
    pub start_time: String,
    pub match_url: String,
}

impl CsvRecord for TodayGame {
    const HEADER: &'static [&'static str] = &["home_team", "away_team", "start_time", "match_url"];
}

#[derive(Debug, Default, Deserialize)]
struct GamesPage {
    #[serde(default)]
    games: Vec<RawGame>,
}

impl<T: Transport, R: RateLimit> Scores365Client<T, R> {
    pub fn fetch_today_games(
        &self,
        league: &LeagueConfig,
        day: NaiveDate,
    ) -> Result<Vec<TodayGame>, FetchError> {
        let url = Self::endpoint(GAMES_PATH);
        let body = self.transport.get_text(&url, &self.competition_query(league))?;
        let page: GamesPage = decode_json(&url, &body)?;
        let games = games_on_day(&page.games, league, day)?;
        if games.is_empty() {
            info!(league = league.name, %day, "no games scheduled");
        }
        Ok(games)
    }
}

/// Games whose kickoff date, in the provider's offset, is `day`.
pub fn games_on_day(
    raw_games: &[RawGame],
    league: &LeagueConfig,
    day: NaiveDate,
) -> Result<Vec<TodayGame>, FetchError> {
    let mut out = Vec::new();
    for raw in raw_games {
        // Games of other days are skipped before their other fields are read.
        if start_time(raw)?.date_naive() != day {
            continue;
        }
        let game = GameRecord::from_raw(raw)?;
        out.push(TodayGame {
            match_url: match_url(league, &game.home, &game.away, game.id),
            start_time: game.start_time.format("%H:%M").to_string(),
            home_team: game.home.name,
            away_team: game.away.name,
        });
    }
    Ok(out)
}
