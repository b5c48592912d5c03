use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use freeslot_core::regenerate;
use freeslot_core::scheduler::progress::reconcile_progress_on_grid;

use super::{load_config, load_snapshot, CommandResult};

#[derive(Args)]
pub struct ProgressArgs {
    /// Snapshot JSON file (updated in place)
    snapshot: PathBuf,
    /// Task ID
    task_id: String,
    /// New progress percentage
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    set: Option<u8>,
    /// Mark the task completed
    #[arg(long, conflicts_with = "set")]
    complete: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
    /// Date due dates are measured from (YYYY-MM-DD, default: today)
    #[arg(long)]
    today: Option<NaiveDate>,
}

pub fn run(args: ProgressArgs, config_path: Option<&Path>) -> CommandResult {
    let config = load_config(config_path)?;
    let mut snapshot = load_snapshot(&args.snapshot)?;
    let today = args.today.unwrap_or_else(|| chrono::Local::now().date_naive());

    // The block the user was shown comes from the snapshot before this update.
    let shown = regenerate(&snapshot, &config, Some(today))
        .recommendations
        .into_iter()
        .find(|r| r.task_id == args.task_id);

    if args.set.is_some() || args.complete {
        snapshot.apply_progress(&args.task_id, args.set, args.complete)?;
        snapshot.save(&args.snapshot)?;
    }
    let task = snapshot
        .task(&args.task_id)
        .ok_or_else(|| format!("unknown task: {}", args.task_id))?;

    let Some(rec) = shown else {
        if task.completed {
            println!("{}: completed", task.title);
        } else {
            println!("{}: {}% done, not scheduled", task.title, task.progress);
        }
        return Ok(());
    };

    let fields = reconcile_progress_on_grid(&rec, task, config.engine.display_grid_minutes)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&fields)?);
    } else if fields.completed || fields.remaining_minutes == 0 {
        println!("{}: completed", task.title);
    } else {
        println!(
            "{}: {}% done, {} min remaining, {} {}-{}",
            task.title,
            fields.progress,
            fields.remaining_minutes,
            rec.window.day(),
            rec.window.start(),
            fields.display_end
        );
    }
    Ok(())
}
