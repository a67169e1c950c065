use std::fmt;
use std::str::FromStr;

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Scores365,
}

impl Page {
    pub const ALL: &'static [Page] = &[Page::Scores365];

    pub fn as_str(self) -> &'static str {
        match self {
            Page::Scores365 => "365Scores",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Page {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .iter()
            .copied()
            .find(|page| page.as_str() == s)
            .ok_or_else(|| FetchError::UnknownPage {
                page: s.to_string(),
                valid: available_pages().iter().map(|p| p.to_string()).collect(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueConfig {
    pub name: &'static str,
    pub numeric_id: u32,
    pub url_slug: &'static str,
}

const fn league(name: &'static str, numeric_id: u32, url_slug: &'static str) -> LeagueConfig {
    LeagueConfig {
        name,
        numeric_id,
        url_slug,
    }
}

const SCORES365_LEAGUES: &[LeagueConfig] = &[
    league("Bundesliga", 25, "bundesliga"),
    league("DFB-Pokal", 28, "dfb-pokal"),
    league("Premier League", 7, "premier-league"),
    league("FA Cup", 8, "fa-cup"),
    league("LaLiga", 11, "laliga"),
    league("Copa del Rey", 13, "copa-del-rey"),
    league("Betplay Dimayor", 620, "liga-betplay"),
    league("Libertadores", 102, "libertadores"),
    league("Sudamericana", 389, "conmebol-sudamericana"),
    league("Europa League", 573, "uefa-europa-league"),
    league("Conference League", 7685, "uefa-conference-league"),
    league("Champions League", 572, "uefa-champions-league"),
    league("Copa America", 595, "copa-america"),
    league("Eurocopa", 6316, "euro"),
];

pub fn available_pages() -> &'static [Page] {
    Page::ALL
}

pub fn leagues_for_page(page: Page) -> &'static [LeagueConfig] {
    match page {
        Page::Scores365 => SCORES365_LEAGUES,
    }
}

pub fn league_names(page: Page) -> Vec<String> {
    leagues_for_page(page)
        .iter()
        .map(|l| l.name.to_string())
        .collect()
}

/// Resolves `league_name` within the registry of `page`.
pub fn validate(league_name: &str, page: &str) -> Result<&'static LeagueConfig, FetchError> {
    let page = page.parse::<Page>()?;
    leagues_for_page(page)
        .iter()
        .find(|l| l.name == league_name)
        .ok_or_else(|| FetchError::UnknownLeague {
            league: league_name.to_string(),
            valid: league_names(page),
        })
}
