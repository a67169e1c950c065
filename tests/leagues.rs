use footyig::leagues::{self, Page, available_pages, league_names, leagues_for_page};
use footyig::FetchError;

#[test]
fn every_known_league_resolves_to_its_config() {
    for page in available_pages() {
        for expected in leagues_for_page(*page) {
            let found = leagues::validate(expected.name, page.as_str()).expect("known league");
            assert_eq!(found, expected);
        }
    }
}

#[test]
fn configured_ids_and_slugs() {
    let pl = leagues::validate("Premier League", "365Scores").expect("known league");
    assert_eq!((pl.numeric_id, pl.url_slug), (7, "premier-league"));
    let dimayor = leagues::validate("Betplay Dimayor", "365Scores").expect("known league");
    assert_eq!((dimayor.numeric_id, dimayor.url_slug), (620, "liga-betplay"));
    let euro = leagues::validate("Eurocopa", "365Scores").expect("known league");
    assert_eq!((euro.numeric_id, euro.url_slug), (6316, "euro"));
}

#[test]
fn unknown_league_lists_valid_names() {
    let err = leagues::validate("Serie A", "365Scores").unwrap_err();
    match err {
        FetchError::UnknownLeague { league, valid } => {
            assert_eq!(league, "Serie A");
            assert_eq!(valid, league_names(Page::Scores365));
            assert!(valid.iter().any(|n| n == "Bundesliga"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn league_names_are_case_sensitive() {
    assert!(leagues::validate("premier league", "365Scores").is_err());
}

#[test]
fn unknown_page_is_rejected_before_league_lookup() {
    let err = leagues::validate("Premier League", "FBref").unwrap_err();
    match err {
        FetchError::UnknownPage { page, valid } => {
            assert_eq!(page, "FBref");
            assert_eq!(valid, vec!["365Scores".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}
