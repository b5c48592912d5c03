//! Backlog tasks and the progress bookkeeping the engine reads from them.
//!
//! Tasks are owned by the task-management side of the application; the
//! engine only reads them. The mutation helpers here are what the
//! progress-check flow uses to write results back before the next
//! regeneration.

pub mod estimate;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Urgency chosen by the student.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank; lower is more urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ValidationError::invalid(
                "priority",
                format!("'{other}' is not one of high, medium, low"),
            )),
        }
    }
}

/// Whether a task is coursework or a personal item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    #[default]
    School,
    Personal,
}

impl std::str::FromStr for TaskKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "school" => Ok(TaskKind::School),
            "personal" => Ok(TaskKind::Personal),
            other => Err(ValidationError::invalid(
                "kind",
                format!("'{other}' is not one of school, personal"),
            )),
        }
    }
}

/// A backlog item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    /// Advisory only; used for ranking, never for windowing.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_minutes: u32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub kind: TaskKind,
    #[serde(default)]
    pub completed: bool,
    /// Percent done, 0..=100.
    #[serde(default)]
    pub progress: u8,
    /// Opted into automatic scheduling.
    #[serde(default)]
    pub eligible: bool,
}

impl Task {
    /// Create a task that is not yet opted into scheduling.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            due_date: None,
            estimated_minutes: 0,
            priority: Priority::default(),
            kind: TaskKind::default(),
            completed: false,
            progress: 0,
            eligible: false,
        }
    }

    pub fn with_due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_minutes = minutes;
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress;
        self
    }

    /// Opt the task into scheduling.
    pub fn eligible(mut self) -> Self {
        self.eligible = true;
        self
    }

    /// Check the task's own invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::invalid("id", "must not be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::invalid("title", "must not be empty"));
        }
        if self.progress > 100 {
            return Err(ValidationError::invalid(
                "progress",
                format!("{} is above 100", self.progress),
            ));
        }
        if self.eligible && self.estimated_minutes == 0 {
            return Err(ValidationError::invalid(
                "estimated_minutes",
                format!("task '{}' is opted in but has no estimate", self.id),
            ));
        }
        Ok(())
    }

    /// Whether the allocator may consider this task at all.
    pub fn is_schedulable(&self) -> bool {
        self.eligible && !self.completed && self.estimated_minutes > 0
    }

    /// Minutes still needed: `ceil(estimated * (100 - progress) / 100)`,
    /// and zero once completed.
    pub fn remaining_minutes(&self) -> u32 {
        if self.completed {
            return 0;
        }
        let left = 100 - u64::from(self.progress.min(100));
        let remaining = (u64::from(self.estimated_minutes) * left).div_ceil(100);
        u32::try_from(remaining).unwrap_or(u32::MAX)
    }

    /// Record progress from a check-in.
    pub fn set_progress(&mut self, progress: u8) -> Result<(), ValidationError> {
        if progress > 100 {
            return Err(ValidationError::invalid(
                "progress",
                format!("{progress} is above 100"),
            ));
        }
        self.progress = progress;
        Ok(())
    }

    /// Mark done; progress is forced to 100.
    pub fn mark_completed(&mut self) {
        self.completed = true;
        self.progress = 100;
    }

    /// Flip the completion checkbox. Returns the new state.
    pub fn toggle_completed(&mut self) -> bool {
        if self.completed {
            self.completed = false;
        } else {
            self.mark_completed();
        }
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(minutes: u32) -> Task {
        Task::new("t-1", "Lab report").with_estimate(minutes).eligible()
    }

    #[test]
    fn remaining_minutes_rounds_up() {
        assert_eq!(task(100).with_progress(50).remaining_minutes(), 50);
        assert_eq!(task(90).with_progress(33).remaining_minutes(), 61);
        assert_eq!(task(1).with_progress(99).remaining_minutes(), 1);
        assert_eq!(task(120).with_progress(100).remaining_minutes(), 0);
    }

    #[test]
    fn remaining_minutes_do_not_wrap_on_huge_estimates() {
        assert_eq!(task(50_000_000).remaining_minutes(), 50_000_000);
        assert_eq!(task(50_000_000).with_progress(50).remaining_minutes(), 25_000_000);
        assert_eq!(task(u32::MAX).remaining_minutes(), u32::MAX);
    }

    #[test]
    fn completion_zeroes_remaining_minutes() {
        let mut t = task(120).with_progress(10);
        t.mark_completed();
        assert_eq!(t.progress, 100);
        assert_eq!(t.remaining_minutes(), 0);
        assert!(!t.is_schedulable());
    }

    #[test]
    fn toggle_completed_flips_state() {
        let mut t = task(60);
        assert!(t.toggle_completed());
        assert!(!t.toggle_completed());
        assert!(!t.completed);
    }

    #[test]
    fn schedulable_requires_opt_in_and_estimate() {
        assert!(task(30).is_schedulable());
        assert!(!Task::new("t-2", "Read").with_estimate(30).is_schedulable());
        assert!(!Task::new("t-3", "Read").eligible().is_schedulable());
    }

    #[test]
    fn validate_rejects_opted_in_task_without_estimate() {
        let err = Task::new("t-1", "Essay").eligible().validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { ref field, .. } if field == "estimated_minutes"));
        assert!(Task::new("t-1", "Essay").validate().is_ok());
        assert!(Task::new("t-1", " ").validate().is_err());
    }

    #[test]
    fn set_progress_rejects_values_above_100() {
        let mut t = task(60);
        assert!(t.set_progress(101).is_err());
        t.set_progress(40).unwrap();
        assert_eq!(t.progress, 40);
    }

    #[test]
    fn json_defaults_fill_missing_fields() {
        let t: Task = serde_json::from_str(
            r#"{"id":"a","title":"Quiz prep","due_date":"2026-10-20","priority":"high"}"#,
        )
        .unwrap();
        assert_eq!(t.due_date, NaiveDate::from_ymd_opt(2026, 10, 20));
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.kind, TaskKind::School);
        assert!(!t.eligible);
        assert_eq!(t.progress, 0);
    }

    #[test]
    fn priority_parses_from_cli_strings() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
        assert!(Priority::High.rank() < Priority::Low.rank());
    }
}
