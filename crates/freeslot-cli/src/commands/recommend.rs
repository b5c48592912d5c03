use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use freeslot_core::{regenerate, AllocationOutcome};

use super::{load_config, load_snapshot, CommandResult};

#[derive(Args)]
pub struct RecommendArgs {
    /// Snapshot JSON file
    snapshot: PathBuf,
    /// Output as JSON
    #[arg(long)]
    json: bool,
    /// Date due dates are measured from (YYYY-MM-DD, default: today)
    #[arg(long)]
    today: Option<NaiveDate>,
}

pub fn run(args: RecommendArgs, config_path: Option<&Path>) -> CommandResult {
    let config = load_config(config_path)?;
    let snapshot = load_snapshot(&args.snapshot)?;
    let today = args.today.unwrap_or_else(|| chrono::Local::now().date_naive());

    let outcome = regenerate(&snapshot, &config, Some(today));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &AllocationOutcome) {
    if outcome.considered == 0 {
        println!("No tasks are waiting for a slot.");
        return;
    }

    for rec in &outcome.recommendations {
        println!(
            "{} {}-{}  {}  [{}]",
            rec.window.day(),
            rec.window.start(),
            rec.display_end,
            rec.task_title,
            rec.signal.as_str()
        );
        println!("    {}", rec.reason);
    }

    println!(
        "allocated {} of {} tasks",
        outcome.allocated, outcome.considered
    );
    if outcome.has_shortfall() {
        println!("no free interval long enough for: {}", outcome.unplaced.join(", "));
    }
    if !outcome.already_done.is_empty() {
        println!("nothing left to do for: {}", outcome.already_done.join(", "));
    }
}
