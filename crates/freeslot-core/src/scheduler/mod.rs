//! Recommendation engine for unscheduled coursework.
//!
//! This module places backlog tasks into weekly free time:
//! - Selects tasks that are opted in, unfinished and estimated
//! - Ranks them by priority, then due date, then backlog order
//! - Assigns each one, first-fit, to the earliest free interval that holds it
//! - Explains every placement with the single most salient signal
//!
//! One call is one allocation pass over a snapshot; nothing is kept between
//! calls, so "regenerate" simply means calling again.

pub mod progress;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::task::{Priority, Task};
use crate::time::{TimeOfDay, Weekday};
use crate::timetable::FreeTimeMap;
use crate::window::{DayRange, TimeWindow};

pub use progress::{reconcile_progress, reconcile_progress_on_grid, DisplayFields};

/// End times are shown rounded up to this grid unless configured otherwise.
pub const DEFAULT_DISPLAY_GRID_MINUTES: u16 = 60;

/// Why a task landed where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementSignal {
    /// Due date is close to the reference date
    DueSoon,
    /// Ranked first because of its priority
    HighPriority,
    /// Takes up most of the interval it was placed in
    TightFit,
    /// Fits comfortably in the earliest interval available
    FitsGap,
}

impl PlacementSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DueSoon => "Deadline approaching",
            Self::HighPriority => "High priority task",
            Self::TightFit => "Fills the free slot",
            Self::FitsGap => "Fits available time",
        }
    }
}

/// A task placed into a recurring weekday window.
///
/// The task itself is not owned; `task_id` refers back to the backlog so
/// the latest progress can be read when the recommendation is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub task_id: String,
    pub task_title: String,
    /// Exact carved window; its length equals `required_minutes`.
    pub window: TimeWindow,
    /// `window.end()` rounded up to the display grid.
    pub display_end: TimeOfDay,
    pub required_minutes: u32,
    pub signal: PlacementSignal,
    pub reason: String,
}

/// Result of one allocation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub recommendations: Vec<Recommendation>,
    /// Tasks that passed selection and were ranked.
    pub considered: usize,
    pub allocated: usize,
    /// Ranked tasks with no interval long enough for them.
    pub unplaced: Vec<String>,
    /// Ranked tasks with nothing left to do.
    pub already_done: Vec<String>,
}

impl AllocationOutcome {
    /// True when some task could not be placed for lack of free time.
    pub fn has_shortfall(&self) -> bool {
        !self.unplaced.is_empty()
    }
}

/// Allocator configuration
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// Grid used to round displayed end times up (minutes)
    pub display_grid_minutes: u16,
    /// A due date within this many days of `reference_date` counts as soon
    pub due_soon_days: i64,
    /// Percentage of an interval a task must use to count as a tight fit
    pub tight_fit_percent: u32,
    /// Date the due-soon signal is measured from; `None` disables it
    pub reference_date: Option<NaiveDate>,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            display_grid_minutes: DEFAULT_DISPLAY_GRID_MINUTES,
            due_soon_days: 3,
            tight_fit_percent: 75,
            reference_date: None,
        }
    }
}

/// Tasks the allocator may place: opted in, not completed, estimated.
pub fn select_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_schedulable()).collect()
}

/// Selected tasks, most urgent first.
///
/// Priority first, then earlier due date (undated last), then backlog order.
pub fn rank_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut ranked = select_tasks(tasks);
    // stable: equal keys keep backlog order
    ranked.sort_by(|a, b| compare_urgency(a, b));
    ranked
}

fn compare_urgency(a: &Task, b: &Task) -> Ordering {
    a.priority
        .rank()
        .cmp(&b.priority.rank())
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(da), Some(db)) => da.cmp(&db),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// First-fit greedy allocator.
pub struct GreedyAllocator {
    config: AllocatorConfig,
}

impl GreedyAllocator {
    /// Create a new allocator with default config
    pub fn new() -> Self {
        Self {
            config: AllocatorConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: AllocatorConfig) -> Self {
        Self { config }
    }

    /// Place `ranked` tasks, in order, into a working copy of `free`.
    pub fn allocate(&self, free: &FreeTimeMap, ranked: &[&Task]) -> AllocationOutcome {
        let mut remaining = free.clone();
        let mut outcome = AllocationOutcome {
            considered: ranked.len(),
            ..AllocationOutcome::default()
        };

        for task in ranked {
            let required = task.remaining_minutes();
            if required == 0 {
                outcome.already_done.push(task.id.clone());
                continue;
            }

            match self.place(&mut remaining, task, required) {
                Some(rec) => {
                    tracing::debug!(
                        task_id = %rec.task_id,
                        window = %rec.window,
                        signal = ?rec.signal,
                        "placed task"
                    );
                    outcome.recommendations.push(rec);
                }
                None => {
                    tracing::debug!(task_id = %task.id, required, "no free interval long enough");
                    outcome.unplaced.push(task.id.clone());
                }
            }
        }

        outcome.allocated = outcome.recommendations.len();
        tracing::info!(
            considered = outcome.considered,
            allocated = outcome.allocated,
            unplaced = outcome.unplaced.len(),
            "allocation pass finished"
        );
        outcome
    }

    /// Carve `required` minutes off the front of the first interval that
    /// holds them, scanning Monday to Friday and earliest start first.
    fn place(&self, free: &mut FreeTimeMap, task: &Task, required: u32) -> Option<Recommendation> {
        for day in Weekday::ALL {
            let ranges = free.get_mut(day);
            let Some(idx) = ranges.iter().position(|r| r.duration_minutes() >= required) else {
                continue;
            };

            let source = ranges[idx];
            let end = source.start().checked_add(required)?;
            let carved = DayRange::new(source.start(), end).ok()?;
            match source.trim_front(required) {
                Some(rest) => ranges[idx] = rest,
                None => {
                    ranges.remove(idx);
                }
            }

            let (signal, reason) = self.explain(task, day, &source, required);
            return Some(Recommendation {
                task_id: task.id.clone(),
                task_title: task.title.clone(),
                window: TimeWindow::on(day, carved),
                display_end: end.ceil_to_grid(self.config.display_grid_minutes),
                required_minutes: required,
                signal,
                reason,
            });
        }
        None
    }

    /// Pick one signal: due soon, then high priority, then how well the
    /// task fills the interval it came from.
    fn explain(
        &self,
        task: &Task,
        day: Weekday,
        source: &DayRange,
        required: u32,
    ) -> (PlacementSignal, String) {
        if let (Some(today), Some(due)) = (self.config.reference_date, task.due_date) {
            let days_left = (due - today).num_days();
            if days_left <= self.config.due_soon_days {
                let when = match days_left {
                    d if d < 0 => format!("overdue by {} day(s)", -d),
                    0 => "due today".to_string(),
                    1 => "due tomorrow".to_string(),
                    d => format!("due in {d} days"),
                };
                return (
                    PlacementSignal::DueSoon,
                    format!("{}: {when} ({due}), scheduled at the first open slot", PlacementSignal::DueSoon.as_str()),
                );
            }
        }

        if task.priority == Priority::High {
            return (
                PlacementSignal::HighPriority,
                format!(
                    "{}: placed ahead of lower-priority work on {day} {}",
                    PlacementSignal::HighPriority.as_str(),
                    source.start()
                ),
            );
        }

        let available = source.duration_minutes();
        let percent = u64::from(self.config.tight_fit_percent.min(100));
        if u64::from(required) * 100 >= u64::from(available) * percent {
            return (
                PlacementSignal::TightFit,
                format!(
                    "{}: uses {required} of the {available}-minute break on {day}",
                    PlacementSignal::TightFit.as_str()
                ),
            );
        }

        (
            PlacementSignal::FitsGap,
            format!(
                "{}: {required} minutes fit the {available}-minute break on {day} with {} to spare",
                PlacementSignal::FitsGap.as_str(),
                available - required
            ),
        )
    }
}

impl Default for GreedyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Rank `tasks` and allocate them into `free` with the default configuration.
pub fn generate_recommendations(free: &FreeTimeMap, tasks: &[Task]) -> AllocationOutcome {
    generate_recommendations_with(free, tasks, AllocatorConfig::default())
}

/// Rank `tasks` and allocate them into `free`.
pub fn generate_recommendations_with(
    free: &FreeTimeMap,
    tasks: &[Task],
    config: AllocatorConfig,
) -> AllocationOutcome {
    let ranked = rank_tasks(tasks);
    tracing::debug!(backlog = tasks.len(), ranked = ranked.len(), "ranked tasks");
    GreedyAllocator::with_config(config).allocate(free, &ranked)
}
