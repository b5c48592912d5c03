//! Progress-aware display fields for existing recommendations.
//!
//! When a task's progress changes, the view re-derives how much is left
//! and when the block now ends. The stored recommendation window is left
//! alone; allocation only changes on the next regeneration.

use serde::{Deserialize, Serialize};

use super::{Recommendation, DEFAULT_DISPLAY_GRID_MINUTES};
use crate::error::ValidationError;
use crate::task::Task;
use crate::time::TimeOfDay;

/// Values a view shows for a recommendation given the task's latest state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFields {
    pub task_id: String,
    pub progress: u8,
    pub completed: bool,
    pub remaining_minutes: u32,
    /// Window start plus remaining minutes, rounded up to the display grid.
    pub display_end: TimeOfDay,
}

/// Recompute display fields on the default hourly grid.
pub fn reconcile_progress(
    recommendation: &Recommendation,
    task: &Task,
) -> Result<DisplayFields, ValidationError> {
    reconcile_progress_on_grid(recommendation, task, DEFAULT_DISPLAY_GRID_MINUTES)
}

/// Recompute display fields, rounding the end time up to `grid` minutes.
///
/// Fails only if `task` is not the task the recommendation was made for.
pub fn reconcile_progress_on_grid(
    recommendation: &Recommendation,
    task: &Task,
    grid: u16,
) -> Result<DisplayFields, ValidationError> {
    if recommendation.task_id != task.id {
        return Err(ValidationError::TaskMismatch {
            expected: recommendation.task_id.clone(),
            actual: task.id.clone(),
        });
    }

    let remaining = task.remaining_minutes();
    let start = recommendation.window.start();
    let display_end = start
        .checked_add(remaining)
        .unwrap_or(TimeOfDay::LAST_MINUTE)
        .ceil_to_grid(grid);

    Ok(DisplayFields {
        task_id: task.id.clone(),
        progress: if task.completed { 100 } else { task.progress },
        completed: task.completed,
        remaining_minutes: remaining,
        display_end,
    })
}
