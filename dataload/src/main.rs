mod input;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

use engine::analytics::{AnalyticsCache, AnalyticsEngine};
use engine::ratings::RatingsUsecase;
use engine::{Config, Normalizer};
use shared::timezone::{civil_date, parse_timezone};
use shared::{RatingMap, Set};

#[derive(Parser, Debug)]
#[command(name = "ladder")]
#[command(about = "Rate doubles sets and report ladder analytics")]
struct Args {
    /// JSON file of exported set rows
    #[arg(short, long, env = "LADDER_SETS_FILE")]
    input: PathBuf,

    /// Pretty-print the JSON report
    #[arg(long, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize the rows and report what was rejected
    Normalize {
        /// Write the accepted sets here as canonical JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Live rating leaderboard
    Ratings,
    /// Rating trajectory of one player
    History {
        #[arg(short, long)]
        player: String,
        /// Use the full prefix replay instead of the single-pass fold
        #[arg(long, default_value_t = false)]
        replay: bool,
    },
    /// Rating deltas for a calendar month, the current one by default
    Deltas {
        #[arg(long, requires = "month")]
        year: Option<i32>,
        #[arg(long, requires = "year")]
        month: Option<u32>,
    },
    /// Season leaderboard, or one player's season score
    Season {
        /// Any date inside the season, today by default
        #[arg(long)]
        reference: Option<NaiveDate>,
        #[arg(short, long)]
        player: Option<String>,
    },
    /// Win and active-week streaks
    Streaks {
        #[arg(short, long)]
        player: Option<String>,
        /// Date the grace period is measured from, today by default
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config::load().context("Invalid ladder configuration")?;
    let tz = parse_timezone(&config.timezone)?;
    let today = civil_date(Utc::now(), tz);

    info!("Loading sets from {}", args.input.display());
    let rows = input::load_rows(&args.input)?;
    let report = Normalizer::new(tz).normalize_all(&rows);
    for (index, reason) in &report.rejections {
        warn!("Row {} rejected: {}", index, reason);
    }

    let usecase = RatingsUsecase::from_config(&config).with_cache(AnalyticsCache::new_default());
    let sets: Vec<Set> = usecase.prepare(&report.sets);

    let output: Value = match args.command {
        Command::Normalize { output } => {
            if let Some(path) = output {
                let canonical = serde_json::to_string_pretty(&report.sets)?;
                fs::write(&path, canonical).with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote {} sets to {}", report.sets.len(), path.display());
            }
            json!({
                "rows": rows.len(),
                "accepted": report.sets.len(),
                "rejected": report.rejection_counts(),
                "rejections": report
                    .rejections
                    .iter()
                    .map(|(index, reason)| json!({ "row": index, "reason": reason.to_string() }))
                    .collect::<Vec<_>>(),
            })
        }
        Command::Ratings => serde_json::to_value(usecase.leaderboard(&sets))?,
        Command::History { player, replay } => {
            let history = if replay {
                usecase.history_replayed(&player, &sets, &RatingMap::new())
            } else {
                usecase.player_history(&player, &sets)
            };
            json!({
                "player": player,
                "current": usecase.current_rating(&player, &sets, &RatingMap::new()),
                "history": history,
            })
        }
        Command::Deltas { year, month } => {
            let deltas = match (year, month) {
                (Some(year), Some(month)) => usecase.monthly_deltas(&sets, year, month)?,
                _ => usecase.current_month_deltas(&sets, Utc::now(), tz)?,
            };
            serde_json::to_value(deltas)?
        }
        Command::Season { reference, player } => {
            let reference = reference.unwrap_or(today);
            match player {
                Some(player) => serde_json::to_value(usecase.season_score(&player, &sets, reference))?,
                None => serde_json::to_value(usecase.season_leaderboard(&sets, reference))?,
            }
        }
        Command::Streaks { player, today: as_of } => {
            let analytics = AnalyticsEngine::with_config(config.streaks);
            let as_of = as_of.unwrap_or(today);
            match player {
                Some(player) => serde_json::to_value(analytics.calculate_streaks(&player, &sets, as_of))?,
                None => serde_json::to_value(analytics.calculate_all_streaks(&sets, as_of))?,
            }
        }
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);
    Ok(())
}
