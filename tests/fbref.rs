use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use footyig::FetchError;
use footyig::export::write_csv;
use footyig::fbref::{
    FbrefClient, LongStatRow, StatTable, combine_long_stats, parse_fixtures, parse_match_team_stats,
};
use footyig::http_client::Transport;
use footyig::rate_limit::NoDelay;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn scratch_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("footyig_fbref_{tag}_{}_{nanos}", std::process::id()))
}

/// Serves one page body and records requested URLs.
struct Page {
    body: String,
    urls: RefCell<Vec<String>>,
}

impl Page {
    fn new(body: String) -> Self {
        Self {
            body,
            urls: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for Page {
    fn get_text(&self, url: &str, _query: &[(&str, String)]) -> Result<String, FetchError> {
        self.urls.borrow_mut().push(url.to_string());
        Ok(self.body.clone())
    }
}

#[test]
fn fixtures_table_rows_skip_spacers_and_repeated_headers() {
    let fixtures = parse_fixtures(&read_fixture("fbref_schedule.html"))
        .expect("parses")
        .expect("table present");
    assert_eq!(fixtures.len(), 3);

    let first = &fixtures[0];
    assert_eq!(first.gameweek, "1");
    assert_eq!(first.date, "2023-08-11");
    assert_eq!(first.start_time, "20:00");
    assert_eq!(first.home_team, "Burnley");
    assert_eq!(first.score, "0–3");
    assert_eq!(first.away_team, "Manchester City");
    assert_eq!(first.attendance, "21,572");
    assert_eq!(
        first.match_url.as_deref(),
        Some("https://fbref.com/en/matches/3a6836b4/Burnley-Manchester-City-August-11-2023-Premier-League")
    );

    assert_eq!(fixtures[1].away_team, "Nott'ham Forest");
    // Unplayed games link to a head-to-head page, not a match report.
    assert_eq!(fixtures[2].date, "2024-05-19");
    assert_eq!(fixtures[2].match_url, None);
}

#[test]
fn commented_fixtures_table_is_found() {
    let plain = parse_fixtures(&read_fixture("fbref_schedule.html")).expect("parses");
    let commented = parse_fixtures(&read_fixture("fbref_schedule_commented.html")).expect("parses");
    assert!(commented.is_some());
    assert_eq!(plain, commented);
}

#[test]
fn page_without_fixtures_table_is_none() {
    let html = "<html><body><!-- a comment about nothing --><p>Rate limited</p></body></html>";
    assert_eq!(parse_fixtures(html).expect("parses"), None);
}

#[test]
fn fetch_fixtures_requests_schedule_url() {
    let page = Page::new(read_fixture("fbref_schedule_commented.html"));
    let client = FbrefClient::new(&page, NoDelay);
    let fixtures = client
        .fetch_fixtures(9, "2023-2024", "Premier-League")
        .expect("fixtures");
    assert_eq!(fixtures.len(), 3);
    assert_eq!(
        page.urls.borrow().as_slice(),
        ["https://fbref.com/en/comps/9/2023-2024/schedule/2023-2024-Premier-League-Scores-and-Fixtures"]
    );
}

#[test]
fn team_stats_read_header_and_value_pairs() {
    let stats = parse_match_team_stats("u", &read_fixture("fbref_match.html")).expect("stats");
    assert_eq!(stats.home, "Burnley");
    assert_eq!(stats.away, "Manchester City");

    let main = stats
        .main
        .iter()
        .map(|l| (l.stat.as_str(), l.home.as_str(), l.away.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        main,
        vec![
            ("Possession", "35%", "65%"),
            ("Passing Accuracy", "255 of 342 — 75%", "89% — 611 of 688"),
            ("Shots on Target", "1 of 6 — 17%", "47% — 8 of 17"),
            ("Saves", "5 of 8 — 63%", "100% — 1 of 1"),
        ]
    );

    let extra = stats.extra.iter().map(|l| l.stat.as_str()).collect::<Vec<_>>();
    assert_eq!(
        extra,
        vec!["Fouls", "Corners", "Crosses", "Touches", "Tackles", "Interceptions"]
    );
    assert_eq!((stats.extra[3].home.as_str(), stats.extra[3].away.as_str()), ("21", "832"));
}

#[test]
fn page_without_team_stats_is_decode_error() {
    let err = parse_match_team_stats("https://fbref.com/en/matches/x/y", "<html></html>").unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[test]
fn match_stats_are_long_rows_tagged_with_match_id() {
    let page = Page::new(read_fixture("fbref_match.html"));
    let client = FbrefClient::new(&page, NoDelay);
    let url = "https://fbref.com/en/matches/3a6836b4/Burnley-Manchester-City-August-11-2023-Premier-League";
    let rows = client.fetch_match_stats(url).expect("stats");

    assert_eq!(rows.len(), 2 * (4 + 6));
    assert!(rows.iter().all(|r| r.match_id == "3a6836b4"));
    assert_eq!(rows[0].stat, "Possession");
    assert_eq!(rows[0].team, "Burnley");
    assert_eq!(rows[4].team, "Manchester City");
    assert_eq!(rows[4].value, "65%");
    assert_eq!(rows[8].table, StatTable::Extra);
    assert_eq!(page.urls.borrow().len(), 1);
}

#[test]
fn non_report_url_is_rejected_before_request() {
    let page = Page::new(String::new());
    let client = FbrefClient::new(&page, NoDelay);
    let err = client
        .fetch_match_stats("https://fbref.com/en/comps/9/Premier-League-Stats")
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
    assert!(page.urls.borrow().is_empty());
}

#[test]
fn per_match_files_combine_in_name_order() {
    let dir = scratch_dir("combine");
    let long_dir = dir.join("long");
    let row = |match_id: &str, value: &str| LongStatRow {
        stat: "Fouls".to_string(),
        team: "Burnley".to_string(),
        value: value.to_string(),
        table: StatTable::Extra,
        match_id: match_id.to_string(),
    };
    write_csv(&long_dir.join("bbbb.csv"), &[row("bbbb", "9")]).expect("write");
    write_csv(&long_dir.join("aaaa.csv"), &[row("aaaa", "11"), row("aaaa", "8")]).expect("write");
    fs::write(long_dir.join("notes.txt"), "ignored").expect("write");

    let out = dir.join("team_stats_long_2023-2024.csv");
    let count = combine_long_stats(&long_dir, &out).expect("combined");
    assert_eq!(count, 3);

    let text = fs::read_to_string(&out).expect("readable");
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "stat,team,value,table,match_id");
    assert_eq!(lines[1], "Fouls,Burnley,11,Extra,aaaa");
    assert_eq!(lines[3], "Fouls,Burnley,9,Extra,bbbb");

    let _ = fs::remove_dir_all(dir);
}
