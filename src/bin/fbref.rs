use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

use footyig::cli::{arg_value, init_env_and_logging};
use footyig::export::write_csv;
use footyig::fbref::{FbrefClient, combine_long_stats, extract_match_id};

fn main() -> Result<()> {
    init_env_and_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let competition_id = match arg_value(&args, "--competition-id") {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("invalid --competition-id '{raw}'"))?,
        None => 9,
    };
    let season = arg_value(&args, "--season").unwrap_or_else(|| "2023-2024".to_string());
    let league = arg_value(&args, "--league").unwrap_or_else(|| "Premier-League".to_string());
    let match_limit = match arg_value(&args, "--matches") {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("invalid --matches '{raw}'"))?,
        None => 0,
    };
    let data_dir = arg_value(&args, "--data-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data").join("raw").join("fbref"));

    let client = FbrefClient::from_env()?;
    let fixtures = client
        .fetch_fixtures(competition_id, &season, &league)
        .with_context(|| format!("fetch fbref fixtures for {league} {season}"))?;
    let fixtures_path = data_dir.join(format!("fixtures_{season}.csv"));
    write_csv(&fixtures_path, &fixtures)?;

    let long_dir = data_dir.join("team_stats").join("long").join(&season);
    let mut scraped = 0usize;
    let mut failures = Vec::new();
    let report_urls = fixtures
        .iter()
        .filter_map(|f| f.match_url.as_deref())
        .take(match_limit)
        .collect::<Vec<_>>();
    for (idx, url) in report_urls.iter().enumerate() {
        println!("Scraping match {}/{}: {url}", idx + 1, report_urls.len());
        let Some(match_id) = extract_match_id(url) else {
            continue;
        };
        match client.fetch_match_stats(url) {
            Ok(rows) => {
                write_csv(&long_dir.join(format!("{match_id}.csv")), &rows)?;
                scraped += 1;
            }
            Err(err) => {
                warn!(url, error = %err, "match stats failed");
                failures.push(format!("{url}: {err}"));
            }
        }
    }

    println!("FBref fixtures complete");
    println!("Fixtures: {}", fixtures.len());
    println!("Output: {}", fixtures_path.display());
    if scraped > 0 {
        let combined = data_dir.join(format!("team_stats_long_{season}.csv"));
        let rows = combine_long_stats(&long_dir, &combined)?;
        println!("Matches scraped: {scraped}");
        println!("Team stat rows: {rows} ({})", combined.display());
    }
    if !failures.is_empty() {
        println!("Errors: {}", failures.len());
        for err in failures.iter().take(8) {
            println!(" - {err}");
        }
    }

    Ok(())
}
