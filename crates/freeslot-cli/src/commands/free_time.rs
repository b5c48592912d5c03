use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args;
use freeslot_core::Weekday;

use super::{load_config, load_snapshot, CommandResult};

#[derive(Args)]
pub struct FreeTimeArgs {
    /// Snapshot JSON file
    snapshot: PathBuf,
    /// Only show one weekday (e.g. "mon")
    #[arg(long)]
    day: Option<Weekday>,
    /// Apply preferred/avoid windows
    #[arg(long)]
    filtered: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: FreeTimeArgs, config_path: Option<&Path>) -> CommandResult {
    let config = load_config(config_path)?;
    let snapshot = load_snapshot(&args.snapshot)?;

    let free = if args.filtered {
        snapshot.filtered_free_time(&config)
    } else {
        snapshot.free_time(&config)
    };
    if args.json {
        let json = match args.day {
            Some(day) => serde_json::to_string_pretty(&BTreeMap::from([(day, free.get(day))]))?,
            None => serde_json::to_string_pretty(&free)?,
        };
        println!("{json}");
        return Ok(());
    }

    let days: Vec<Weekday> = match args.day {
        Some(day) => vec![day],
        None => Weekday::ALL.to_vec(),
    };
    for day in days {
        let ranges = free.get(day);
        let listed = if ranges.is_empty() {
            "-".to_string()
        } else {
            ranges.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        };
        println!("{day}  {listed}  ({} min)", free.total_minutes(day));
    }
    if args.day.is_none() {
        println!("total  {} min", free.total_minutes_all());
    }
    Ok(())
}
