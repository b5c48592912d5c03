//! # Freeslot Core Library
//!
//! This library provides the recommendation engine that places unscheduled
//! coursework into the free periods of a weekly class timetable. Like the
//! CLI built on it, it takes a snapshot of the timetable, backlog and
//! preferences and returns a fresh set of recommendations on every call.
//!
//! ## Architecture
//!
//! - **Timetable**: Per-weekday free intervals left open by classes
//! - **Preferences**: Narrowing free time to preferred windows and cutting
//!   avoided ones
//! - **Scheduler**: Task selection, urgency ranking and first-fit greedy
//!   allocation, plus progress-aware display fields
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`compute_free_time`]: Free intervals from class slots
//! - [`filter_by_preferences`]: Preference filter over a [`FreeTimeMap`]
//! - [`generate_recommendations`]: Ranking plus allocation
//! - [`reconcile_progress`]: Remaining minutes and display end for a task
//! - [`regenerate`]: The whole pipeline over a [`Snapshot`]

pub mod error;
pub mod preferences;
pub mod scheduler;
pub mod snapshot;
pub mod storage;
pub mod task;
pub mod time;
pub mod timetable;
pub mod window;

pub use error::{ConfigError, CoreError, ValidationError};
pub use preferences::{filter_by_preferences, Preferences};
pub use scheduler::{
    generate_recommendations, generate_recommendations_with, rank_tasks, reconcile_progress,
    select_tasks, AllocationOutcome, AllocatorConfig, DisplayFields, GreedyAllocator,
    PlacementSignal, Recommendation,
};
pub use snapshot::{regenerate, Snapshot};
pub use storage::Config;
pub use task::estimate::{opt_in, DurationEstimator, KeywordEstimator};
pub use task::{Priority, Task, TaskKind};
pub use time::{TimeOfDay, Weekday};
pub use timetable::{compute_free_time, ClassSlot, FreeTimeCalculator, FreeTimeMap, WorkingBound};
pub use window::{DayRange, TimeWindow};
