use std::path::PathBuf;

use anyhow::{Context, Result};

use footyig::cli::{arg_value, has_flag, init_env_and_logging};
use footyig::{RoundFailurePolicy, Scores365Client, Scores365Config, export, leagues};

const DEFAULT_LEAGUE: &str = "Premier League";
const DEFAULT_PAGE: &str = "365Scores";

fn main() -> Result<()> {
    init_env_and_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let league_name = arg_value(&args, "--league").unwrap_or_else(|| DEFAULT_LEAGUE.to_string());
    let page = arg_value(&args, "--page").unwrap_or_else(|| DEFAULT_PAGE.to_string());
    let league = leagues::validate(&league_name, &page)?;

    let mut config = Scores365Config::from_env();
    if has_flag(&args, "--keep-partial") {
        config = config.with_round_failure(RoundFailurePolicy::KeepPartial);
    }
    let as_json = has_flag(&args, "--json");
    let out_path = arg_value(&args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_out_path(league.url_slug, as_json));

    let client = Scores365Client::from_config(config)?;
    let schedule = client
        .fetch_season_schedule(league)
        .with_context(|| format!("fetch season schedule for {}", league.name))?;

    if as_json {
        export::write_json(&out_path, &schedule.rows)?;
    } else {
        export::write_csv(&out_path, &schedule.rows)?;
    }

    println!("Season schedule complete");
    println!("League: {} ({})", league.name, league.numeric_id);
    println!(
        "Rounds: {}/{}",
        schedule.rounds_fetched, schedule.rounds_total
    );
    println!("Games: {}", schedule.rows.len());
    println!("Output: {}", out_path.display());
    if !schedule.errors.is_empty() {
        println!("Errors: {}", schedule.errors.len());
        for err in schedule.errors.iter().take(8) {
            println!(" - {err}");
        }
    }

    Ok(())
}

fn default_out_path(slug: &str, as_json: bool) -> PathBuf {
    let ext = if as_json { "json" } else { "csv" };
    PathBuf::from("data")
        .join("raw")
        .join("365scores")
        .join(format!("season_games_{slug}.{ext}"))
}
