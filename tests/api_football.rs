use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use footyig::FetchError;
use footyig::api_football::{ApiFootballClient, find_league};
use footyig::http_client::Transport;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

struct Canned {
    body: String,
    calls: RefCell<Vec<(String, Vec<(String, String)>)>>,
}

impl Canned {
    fn new(name: &str) -> Self {
        Self {
            body: read_fixture(name),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for Canned {
    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let params = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.calls.borrow_mut().push((url.to_string(), params));
        Ok(self.body.clone())
    }
}

#[test]
fn fixtures_by_league_and_season() {
    let transport = Canned::new("api_football_fixtures.json");
    let client = ApiFootballClient::new(&transport);
    let season = client.fetch_fixtures(39, 2023).expect("fixtures");

    let calls = transport.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "https://v3.football.api-sports.io/fixtures");
    assert_eq!(
        calls[0].1,
        vec![
            ("league".to_string(), "39".to_string()),
            ("season".to_string(), "2023".to_string())
        ]
    );

    assert_eq!(season.fixtures.len(), 2);
    let played = &season.fixtures[0];
    assert_eq!(played.fixture_id, 1035037);
    assert_eq!(played.round, "Regular Season - 1");
    assert_eq!(played.status, "FT");
    assert_eq!(played.venue, "Turf Moor");
    assert_eq!((played.home_team.as_str(), played.away_team.as_str()), ("Burnley", "Manchester City"));
    assert_eq!((played.home_goals, played.away_goals), (Some(0), Some(3)));

    let upcoming = &season.fixtures[1];
    assert_eq!(upcoming.venue, "");
    assert_eq!((upcoming.home_goals, upcoming.away_goals), (None, None));

    assert_eq!(season.raw["results"], 2);
}

#[test]
fn provider_error_object_is_reported() {
    let transport = Canned::new("api_football_error.json");
    let client = ApiFootballClient::new(&transport);
    let err = client.fetch_fixtures(39, 2025).unwrap_err();
    match err {
        FetchError::Provider { url, message } => {
            assert!(url.ends_with("/fixtures"));
            assert!(message.starts_with("plan: Free plans"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn leagues_are_found_by_name_and_country() {
    let transport = Canned::new("api_football_leagues.json");
    let client = ApiFootballClient::new(&transport);
    let leagues = client.fetch_leagues().expect("leagues");
    assert_eq!(leagues.len(), 2);

    let epl = find_league(&leagues, "Premier League", "England").expect("english league");
    assert_eq!(epl.id, 39);
    assert_eq!(epl.seasons, vec![2021, 2022, 2023]);
    assert_eq!(find_league(&leagues, "Premier League", "Scotland"), None);
}

#[test]
fn null_body_is_no_fixtures() {
    struct Empty;
    impl Transport for Empty {
        fn get_text(&self, _url: &str, _query: &[(&str, String)]) -> Result<String, FetchError> {
            Ok("null".to_string())
        }
    }
    let season = ApiFootballClient::new(Empty).fetch_fixtures(39, 2023).expect("empty");
    assert!(season.fixtures.is_empty());
}
