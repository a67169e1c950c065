use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use footyig::cli::{arg_value, init_env_and_logging};
use footyig::{Scores365Client, Scores365Config, export, leagues};

fn main() -> Result<()> {
    init_env_and_logging();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let league_name = arg_value(&args, "--league").context("missing --league <name>")?;
    let league = leagues::validate(&league_name, "365Scores")?;
    let day = match arg_value(&args, "--date") {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("invalid --date '{raw}', expected YYYY-MM-DD"))?,
        None => Local::now().date_naive(),
    };

    let client = Scores365Client::from_config(Scores365Config::from_env())?;
    let games = client
        .fetch_today_games(league, day)
        .with_context(|| format!("fetch games of {day} for {}", league.name))?;

    if let Some(out) = arg_value(&args, "--out") {
        export::write_csv(Path::new(&out), &games)?;
    }

    println!("{} on {}: {} games", league.name, day, games.len());
    for game in &games {
        println!(
            "{}  {} vs {}  {}",
            game.start_time, game.home_team, game.away_team, game.match_url
        );
    }

    Ok(())
}
