//! Input snapshots and the full regeneration pipeline.
//!
//! A [`Snapshot`] is everything one allocation pass reads: the weekly
//! timetable, the backlog and (optionally) the user's preferences. Callers
//! regenerate from a fresh snapshot and replace their stored
//! recommendations wholesale with the result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, ValidationError};
use crate::preferences::{filter_by_preferences, Preferences};
use crate::scheduler::{generate_recommendations_with, AllocationOutcome};
use crate::storage::Config;
use crate::task::Task;
use crate::time::Weekday;
use crate::timetable::{compute_free_time, ClassSlot, FreeTimeMap};
use crate::window::{DayRange, TimeWindow};

// Windows are read as plain strings and checked afterwards, so a bad
// window surfaces as a `ValidationError` rather than a JSON error.
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    class_slots: Vec<RawSlot>,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    preferences: Option<RawPreferences>,
}

#[derive(Deserialize)]
struct RawSlot {
    day: String,
    start: String,
    end: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    blocked: bool,
}

#[derive(Deserialize)]
struct RawSpan {
    start: String,
    end: String,
}

#[derive(Deserialize)]
struct RawPreferences {
    #[serde(default)]
    preferred: Vec<RawSpan>,
    #[serde(default)]
    avoid: Vec<RawSpan>,
}

impl RawSlot {
    fn validate(self) -> Result<ClassSlot, ValidationError> {
        let day: Weekday = self.day.parse()?;
        Ok(ClassSlot {
            window: TimeWindow::on(day, DayRange::parse(&self.start, &self.end)?),
            subject: self.subject,
            blocked: self.blocked,
        })
    }
}

fn parse_spans(spans: Vec<RawSpan>) -> Result<Vec<DayRange>, ValidationError> {
    spans
        .into_iter()
        .map(|span| DayRange::parse(&span.start, &span.end))
        .collect()
}

impl TryFrom<RawSnapshot> for Snapshot {
    type Error = ValidationError;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        let class_slots = raw
            .class_slots
            .into_iter()
            .map(RawSlot::validate)
            .collect::<Result<_, _>>()?;
        let preferences = match raw.preferences {
            Some(p) => Some(Preferences {
                preferred: parse_spans(p.preferred)?,
                avoid: parse_spans(p.avoid)?,
            }),
            None => None,
        };
        let snapshot = Snapshot {
            class_slots,
            tasks: raw.tasks,
            preferences,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub class_slots: Vec<ClassSlot>,
    pub tasks: Vec<Task>,
    /// Overrides the preferences stored in the config file when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

impl Snapshot {
    /// Parse and validate a JSON snapshot.
    ///
    /// Malformed JSON is a `CoreError::Json`; a window or task that parses
    /// but breaks the model is a `CoreError::Validation`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        Ok(Snapshot::try_from(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check every task and reject duplicate ids.
    ///
    /// Windows are already checked when they are built or parsed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for task in &self.tasks {
            task.validate()?;
            if !seen.insert(task.id.as_str()) {
                return Err(ValidationError::DuplicateTaskId(task.id.clone()));
            }
        }
        Ok(())
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Append a task, rejecting it if invalid or its id is taken.
    pub fn add_task(&mut self, task: Task) -> Result<(), ValidationError> {
        task.validate()?;
        if self.task(&task.id).is_some() {
            return Err(ValidationError::DuplicateTaskId(task.id));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Write back a progress check-in.
    ///
    /// `completed` marks the task done (progress 100); otherwise `progress`
    /// is recorded if given.
    pub fn apply_progress(
        &mut self,
        task_id: &str,
        progress: Option<u8>,
        completed: bool,
    ) -> Result<&Task, ValidationError> {
        let task = self
            .task_mut(task_id)
            .ok_or_else(|| ValidationError::UnknownTask(task_id.to_string()))?;
        if completed {
            task.mark_completed();
        } else if let Some(progress) = progress {
            task.set_progress(progress)?;
        }
        tracing::debug!(task_id, progress = task.progress, completed = task.completed, "progress updated");
        Ok(task)
    }

    /// Preferences in effect: the snapshot's own, or `fallback`.
    pub fn preferences_or<'a>(&'a self, fallback: &'a Preferences) -> &'a Preferences {
        self.preferences.as_ref().unwrap_or(fallback)
    }

    /// Free time from the timetable alone.
    pub fn free_time(&self, config: &Config) -> FreeTimeMap {
        compute_free_time(&self.class_slots, config.working_bound())
    }

    /// Free time narrowed by the preferences in effect.
    pub fn filtered_free_time(&self, config: &Config) -> FreeTimeMap {
        filter_by_preferences(
            &self.free_time(config),
            self.preferences_or(&config.preferences),
        )
    }
}

/// One full allocation pass over `snapshot`.
///
/// `reference_date` only feeds the due-soon explanation; placement does not
/// depend on it.
pub fn regenerate(
    snapshot: &Snapshot,
    config: &Config,
    reference_date: Option<NaiveDate>,
) -> AllocationOutcome {
    let free = snapshot.filtered_free_time(config);
    tracing::debug!(free_minutes = free.total_minutes_all(), "filtered free time");
    generate_recommendations_with(&free, &snapshot.tasks, config.allocator_config(reference_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    const SAMPLE: &str = r#"{
        "class_slots": [
            {"day": "Mon", "start": "09:00", "end": "10:00", "subject": "Data Structures"},
            {"day": "Mon", "start": "13:00", "end": "14:00", "subject": "Algorithms"},
            {"day": "Mon", "start": "15:00", "end": "16:00", "blocked": true}
        ],
        "tasks": [
            {"id": "hw1", "title": "OS homework", "estimated_minutes": 90, "priority": "high", "eligible": true},
            {"id": "read", "title": "Reading", "estimated_minutes": 60, "priority": "low", "eligible": true},
            {"id": "idea", "title": "Side project", "priority": "low"}
        ],
        "preferences": {"avoid": [{"start": "12:00", "end": "13:00"}]}
    }"#;

    #[test]
    fn parses_and_regenerates() {
        let snapshot = Snapshot::from_json(SAMPLE).unwrap();
        let config = Config::default();

        let free = snapshot.filtered_free_time(&config);
        assert_eq!(free.total_minutes(Weekday::Mon), 120 + 60 + 120);

        let outcome = regenerate(&snapshot, &config, None);
        assert_eq!(outcome.considered, 2);
        assert_eq!(outcome.allocated, 2);
        assert_eq!(outcome.recommendations[0].task_id, "hw1");
        assert_eq!(outcome.recommendations[0].window.to_string(), "Mon 10:00-11:30");
        assert_eq!(outcome.recommendations[1].window.to_string(), "Mon 14:00-15:00");
    }

    #[test]
    fn config_preferences_apply_when_snapshot_has_none() {
        let mut snapshot = Snapshot::from_json(SAMPLE).unwrap();
        snapshot.preferences = None;
        let mut config = Config::default();
        config
            .set("preferences.preferred", r#"[{"start":"16:00","end":"18:00"}]"#)
            .unwrap();
        let free = snapshot.filtered_free_time(&config);
        assert_eq!(free.total_minutes(Weekday::Mon), 120);
        assert_eq!(free.total_minutes(Weekday::Tue), 120);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"{"tasks": [
            {"id": "a", "title": "One"},
            {"id": "a", "title": "Two"}
        ]}"#;
        assert!(matches!(
            Snapshot::from_json(json),
            Err(CoreError::Validation(ValidationError::DuplicateTaskId(_)))
        ));
    }

    #[test]
    fn rejects_malformed_windows_as_validation_errors() {
        let json = r#"{"class_slots": [{"day": "Tue", "start": "11:00", "end": "10:00", "subject": "X"}]}"#;
        assert!(matches!(
            Snapshot::from_json(json),
            Err(CoreError::Validation(ValidationError::InvalidTimeRange { .. }))
        ));

        let json = r#"{"class_slots": [{"day": "Sat", "start": "09:00", "end": "10:00"}]}"#;
        assert!(matches!(
            Snapshot::from_json(json),
            Err(CoreError::Validation(ValidationError::UnsupportedWeekday(_)))
        ));

        let json = r#"{"preferences": {"avoid": [{"start": "25:00", "end": "26:00"}]}}"#;
        assert!(matches!(
            Snapshot::from_json(json),
            Err(CoreError::Validation(ValidationError::InvalidTimeOfDay(_)))
        ));
    }

    #[test]
    fn broken_json_is_still_a_json_error() {
        assert!(matches!(Snapshot::from_json("{\"tasks\": ["), Err(CoreError::Json(_))));
    }

    #[test]
    fn progress_write_back_drops_completed_tasks() {
        let mut snapshot = Snapshot::from_json(SAMPLE).unwrap();
        snapshot.apply_progress("hw1", None, true).unwrap();
        let outcome = regenerate(&snapshot, &Config::default(), None);
        assert_eq!(outcome.considered, 1);
        assert_eq!(outcome.recommendations[0].task_id, "read");
        assert_eq!(outcome.recommendations[0].window.to_string(), "Mon 10:00-11:00");
    }

    #[test]
    fn progress_write_back_validates() {
        let mut snapshot = Snapshot::from_json(SAMPLE).unwrap();
        assert!(matches!(
            snapshot.apply_progress("missing", Some(10), false),
            Err(ValidationError::UnknownTask(_))
        ));
        assert!(snapshot.apply_progress("hw1", Some(150), false).is_err());
        let task = snapshot.apply_progress("hw1", Some(40), false).unwrap();
        assert_eq!(task.progress, 40);
    }

    #[test]
    fn add_task_rejects_taken_ids() {
        let mut snapshot = Snapshot::from_json(SAMPLE).unwrap();
        assert!(snapshot.add_task(Task::new("hw1", "Again")).is_err());
        snapshot.add_task(Task::new("new", "Fresh")).unwrap();
        assert_eq!(snapshot.tasks.len(), 4);
    }

    #[test]
    fn save_and_load_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let snapshot = Snapshot::from_json(SAMPLE).unwrap();
        snapshot.save(&path).unwrap();
        assert_eq!(Snapshot::load(&path).unwrap(), snapshot);
    }
}
