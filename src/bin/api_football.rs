use std::path::PathBuf;

use anyhow::{Context, Result};

use footyig::api_football::{ApiFootballClient, ApiFootballConfig, find_league};
use footyig::cli::{arg_value, has_flag, init_env_and_logging};
use footyig::export;

fn main() -> Result<()> {
    init_env_and_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let config = ApiFootballConfig::from_env()?;
    let client = ApiFootballClient::from_config(&config)?;

    if let Some(name) = arg_value(&args, "--find-league") {
        let country = arg_value(&args, "--country").unwrap_or_else(|| "England".to_string());
        let leagues = client.fetch_leagues().context("fetch api-football leagues")?;
        match find_league(&leagues, &name, &country) {
            Some(league) => {
                println!("{} ({}) found", league.name, league.country);
                println!("ID: {}", league.id);
                println!("Years available: {:?}", league.seasons);
            }
            None => println!("No league named {name} in {country}"),
        }
        return Ok(());
    }

    let league_id = match arg_value(&args, "--league-id") {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("invalid --league-id '{raw}'"))?,
        None => 39,
    };
    // Free plans only cover seasons up to 2023.
    let season = match arg_value(&args, "--season") {
        Some(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("invalid --season '{raw}'"))?,
        None => 2023,
    };
    let as_csv = has_flag(&args, "--csv");
    let out_path = arg_value(&args, "--out").map(PathBuf::from).unwrap_or_else(|| {
        let ext = if as_csv { "csv" } else { "json" };
        PathBuf::from("data")
            .join("raw")
            .join("api_football")
            .join(format!("fixtures_{league_id}_{season}.{ext}"))
    });

    let fixtures = client
        .fetch_fixtures(league_id, season)
        .with_context(|| format!("fetch api-football fixtures for league {league_id} season {season}"))?;

    if as_csv {
        export::write_csv(&out_path, &fixtures.fixtures)?;
    } else {
        export::write_json(&out_path, &fixtures.raw)?;
    }

    println!("Matches obtained: {}", fixtures.fixtures.len());
    println!("Output: {}", out_path.display());

    Ok(())
}
