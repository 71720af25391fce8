//! `csdc`: score a season from a config file and an event snapshot.

mod logging;
mod output;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use csdc_core::season::OneTimeScorer;
use csdc_core::{score_season, SeasonConfig, Standings};
use snapshot_store::SnapshotStore;

#[derive(Parser)]
#[command(name = "csdc")]
#[command(about = "Score a weekly tournament season", long_about = None)]
struct Cli {
    /// Season configuration file
    #[arg(long, global = true, default_value = "csdc.json")]
    config: PathBuf,

    /// Event snapshot exported by ingestion
    #[arg(long, global = true, default_value = "snapshot.json")]
    snapshot: PathBuf,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// More logging; repeat for more
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ranked season standings
    Standings,

    /// One week's table
    Week {
        #[arg(long)]
        number: u32,
    },

    /// Built-in and configured achievement rules
    Rules,

    /// The week being played now
    CurrentWeek {
        /// Instant to check instead of now (RFC 3339)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Rescore periodically, replacing an output file each time
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value = "300")]
        interval: u64,

        /// Standings JSON to keep up to date
        #[arg(long)]
        out: PathBuf,

        /// Refresh once and exit
        #[arg(long)]
        once: bool,
    },
}

fn load_config(path: &Path) -> Result<SeasonConfig> {
    SeasonConfig::from_path(path)
        .with_context(|| format!("failed to load season config {}", path.display()))
}

fn refresh(config: &SeasonConfig, snapshot: &Path) -> Result<Standings> {
    let store = SnapshotStore::load(snapshot)
        .with_context(|| format!("failed to load snapshot {}", snapshot.display()))?;
    Ok(score_season(config, &store)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn watch(
    config: &SeasonConfig,
    snapshot: &Path,
    out: &Path,
    interval: u64,
    once: bool,
) -> Result<()> {
    loop {
        // A failed pass leaves the previous file in place.
        match refresh(config, snapshot).and_then(|s| output::write_atomically(out, &s)) {
            Ok(()) => log::info!("wrote {}", out.display()),
            Err(err) => log::error!("refresh failed: {:#}", err),
        }
        if once {
            return Ok(());
        }
        std::thread::sleep(Duration::from_secs(interval));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Standings => {
            let standings = refresh(&config, &cli.snapshot)?;
            if cli.json {
                print_json(&standings)?;
            } else {
                print!("{}", output::season_table(&standings));
            }
        }

        Commands::Week { number } => {
            if config.week(number).is_none() {
                bail!("season {:?} has no week {}", config.name(), number);
            }
            let standings = refresh(&config, &cli.snapshot)?;
            let table = standings
                .week(number)
                .with_context(|| format!("week {} was not scored", number))?;
            if cli.json {
                print_json(table)?;
            } else {
                print!("{}", output::week_table(table, &standings));
            }
        }

        Commands::Rules => {
            let one_time = OneTimeScorer::default();
            let bonus = config.bonus_rules();
            if cli.json {
                print_json(&serde_json::json!({
                    "one_time": one_time.rules(),
                    "bonus": bonus,
                }))?;
            } else {
                print!("{}", output::rule_list("One-time achievements", one_time.rules()));
                print!("{}", output::rule_list("Bonus rules", &bonus));
            }
        }

        Commands::CurrentWeek { at } => {
            let now = at.unwrap_or_else(Utc::now);
            match config.current_week(now) {
                Some(week) if cli.json => print_json(&serde_json::json!({
                    "number": week.number,
                    "combo": week.combo.to_string(),
                    "gods": week.gods,
                    "start": week.start,
                    "end": week.end,
                }))?,
                Some(week) => println!(
                    "Week {}: {} ({} to {})",
                    week.number, week.combo, week.start, week.end
                ),
                None => println!("No week is running at {}", now),
            }
        }

        Commands::Watch {
            interval,
            out,
            once,
        } => watch(&config, &cli.snapshot, &out, interval, once)?,
    }

    Ok(())
}
