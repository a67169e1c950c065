//! Football data acquisition from the 365Scores web API, with secondary
//! sources for FBref static pages and the keyed API-Football service.
//!
//! The main flow validates a league, pages through every round of its
//! current season and flattens the games into sorted rows:
//!
//! ```rust,ignore
//! use footyig::{Scores365Client, Scores365Config, leagues};
//!
//! let league = leagues::validate("Premier League", "365Scores")?;
//! let client = Scores365Client::from_config(Scores365Config::from_env())?;
//! let schedule = client.fetch_season_schedule(league)?;
//! footyig::export::write_csv("season.csv".as_ref(), &schedule.rows)?;
//! ```

pub mod api_football;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fbref;
pub mod http_client;
pub mod leagues;
pub mod normalize;
pub mod player_stats;
pub mod rate_limit;
pub mod schedule_fetch;
pub mod scores365;
pub mod today_games;

pub use config::{RoundFailurePolicy, Scores365Config};
pub use error::FetchError;
pub use leagues::{LeagueConfig, Page};
pub use normalize::{NormalizedRow, RawGame, normalize};
pub use scores365::Scores365Client;
pub use schedule_fetch::{SeasonGames, SeasonSchedule};
