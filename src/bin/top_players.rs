use std::path::PathBuf;

use anyhow::{Context, Result};

use footyig::cli::{arg_value, has_flag, init_env_and_logging};
use footyig::{Scores365Client, Scores365Config, export, leagues};

fn main() -> Result<()> {
    init_env_and_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let league_name = arg_value(&args, "--league").context("missing --league <name>")?;
    let league = leagues::validate(&league_name, "365Scores")?;
    let as_json = has_flag(&args, "--json");
    let out_path = arg_value(&args, "--out").map(PathBuf::from).unwrap_or_else(|| {
        let ext = if as_json { "json" } else { "csv" };
        PathBuf::from("data")
            .join("raw")
            .join("365scores")
            .join(format!("top_players_{}.{ext}", league.url_slug))
    });

    let client = Scores365Client::from_config(Scores365Config::from_env())?;
    let rows = client
        .fetch_top_player_stats(league)
        .with_context(|| format!("fetch top player stats for {}", league.name))?;

    if as_json {
        export::write_json(&out_path, &rows)?;
    } else {
        export::write_csv(&out_path, &rows)?;
    }

    println!("Top player stats complete");
    println!("League: {}", league.name);
    println!("Rows: {}", rows.len());
    println!("Output: {}", out_path.display());

    Ok(())
}
