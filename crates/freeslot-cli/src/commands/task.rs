//! Task management commands for CLI.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Subcommand;
use freeslot_core::{opt_in, CoreError, KeywordEstimator, Priority, Snapshot, Task, TaskKind};
use uuid::Uuid;

use super::{load_snapshot, CommandResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a snapshot (created if missing)
    Add {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Task title
        title: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Priority: high, medium or low (default: medium)
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Kind: school or personal (default: school)
        #[arg(long, default_value = "school")]
        kind: TaskKind,
        /// Estimated minutes
        #[arg(long)]
        minutes: Option<u32>,
        /// Opt the task into recommendations right away
        #[arg(long)]
        opt_in: bool,
    },
    /// Opt a task into recommendations, estimating it if needed
    OptIn {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Task ID
        id: String,
        /// Estimated minutes (overrides the keyword estimate)
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// List tasks in a snapshot
    List {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: TaskAction) -> CommandResult {
    match action {
        TaskAction::Add {
            snapshot: path,
            title,
            due,
            priority,
            kind,
            minutes,
            opt_in: eligible,
        } => {
            let mut snapshot = load_or_new(&path)?;
            let mut task = Task::new(Uuid::new_v4().to_string(), title)
                .with_priority(priority)
                .with_kind(kind)
                .with_estimate(minutes.unwrap_or(0));
            if let Some(due) = due {
                task = task.with_due(due);
            }
            if eligible {
                opt_in(&mut task, &KeywordEstimator::new())?;
            }
            let id = task.id.clone();
            snapshot.add_task(task)?;
            snapshot.save(&path)?;
            println!("{id}");
        }
        TaskAction::OptIn {
            snapshot: path,
            id,
            minutes,
        } => {
            let mut snapshot = load_snapshot(&path)?;
            let task = snapshot
                .task_mut(&id)
                .ok_or_else(|| format!("unknown task: {id}"))?;
            if let Some(minutes) = minutes {
                task.estimated_minutes = minutes;
            }
            opt_in(task, &KeywordEstimator::new())?;
            println!("{}: {} min", task.title, task.estimated_minutes);
            snapshot.save(&path)?;
        }
        TaskAction::List {
            snapshot: path,
            json,
        } => {
            let snapshot = load_snapshot(&path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.tasks)?);
                return Ok(());
            }
            for task in &snapshot.tasks {
                let due = task
                    .due_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let state = if task.completed {
                    "done"
                } else if task.eligible {
                    "open"
                } else {
                    "backlog"
                };
                println!(
                    "{}  {:<7} {:<6} {:>4} min {:>3}%  due {}  {}",
                    task.id,
                    state,
                    task.priority.to_string(),
                    task.estimated_minutes,
                    task.progress,
                    due,
                    task.title
                );
            }
        }
    }
    Ok(())
}

fn load_or_new(path: &Path) -> Result<Snapshot, CoreError> {
    if path.exists() {
        load_snapshot(path)
    } else {
        Ok(Snapshot::default())
    }
}
