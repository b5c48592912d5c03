//! Duration estimation for tasks being opted into scheduling.
//!
//! The engine never depends on how an estimate is produced; anything that
//! implements [`DurationEstimator`] can be plugged in. [`KeywordEstimator`]
//! is the built-in heuristic that looks at the task title.

use super::{Task, TaskKind};
use crate::error::ValidationError;

/// Produces an estimated working time for a task.
pub trait DurationEstimator {
    /// Estimated minutes, always greater than zero.
    fn estimate_minutes(&self, task: &Task) -> u32;
}

/// Title keyword heuristic.
///
/// Rules are checked in order and the first match wins; titles with no
/// known keyword fall back to a per-kind default.
#[derive(Debug, Clone)]
pub struct KeywordEstimator {
    rules: Vec<(Vec<String>, u32)>,
    school_default: u32,
    personal_default: u32,
}

impl Default for KeywordEstimator {
    fn default() -> Self {
        let rule = |words: &[&str], minutes: u32| {
            (words.iter().map(|w| w.to_string()).collect::<Vec<_>>(), minutes)
        };
        Self {
            rules: vec![
                rule(&["project", "프로젝트"], 180),
                rule(&["exam", "test prep", "midterm", "final", "시험", "준비"], 120),
                rule(&["report", "보고서"], 120),
                rule(&["presentation", "발표"], 90),
                rule(&["assignment", "homework", "과제", "숙제"], 90),
                rule(&["reading", "read ", "읽기", "독서"], 60),
                rule(&["problem set", "practice", "exercise", "문제풀이", "연습"], 60),
            ],
            school_default: 90,
            personal_default: 60,
        }
    }
}

impl KeywordEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule checked before the built-in ones.
    pub fn with_rule(mut self, keywords: &[&str], minutes: u32) -> Self {
        let words = keywords.iter().map(|w| w.to_lowercase()).collect();
        self.rules.insert(0, (words, minutes.max(1)));
        self
    }
}

impl DurationEstimator for KeywordEstimator {
    fn estimate_minutes(&self, task: &Task) -> u32 {
        // trailing space lets "read " match a title ending in "read"
        let title = format!("{} ", task.title.to_lowercase());
        self.rules
            .iter()
            .find(|(words, _)| words.iter().any(|w| title.contains(w.as_str())))
            .map(|(_, minutes)| *minutes)
            .unwrap_or(match task.kind {
                TaskKind::School => self.school_default,
                TaskKind::Personal => self.personal_default,
            })
    }
}

/// Opt a task into scheduling.
///
/// A user-supplied estimate is kept; otherwise `estimator` fills it in.
/// Completed tasks cannot be opted in.
pub fn opt_in(task: &mut Task, estimator: &dyn DurationEstimator) -> Result<(), ValidationError> {
    if task.completed {
        return Err(ValidationError::invalid(
            "completed",
            format!("task '{}' is already completed", task.id),
        ));
    }
    if task.estimated_minutes == 0 {
        task.estimated_minutes = estimator.estimate_minutes(task).max(1);
    }
    task.eligible = true;
    task.validate()
}
