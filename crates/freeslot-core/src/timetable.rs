//! Weekly free-time calculation from a class timetable.
//!
//! For each weekday the occupied class periods are merged and their
//! complement within the working bound becomes the free intervals.
//! Reserved slots (no subject, or flagged `blocked`) are not classes but
//! are still cut out of the result so nothing gets placed into them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::time::{TimeOfDay, Weekday};
use crate::window::{merge_ranges, subtract_all, DayRange, TimeWindow};

#[derive(Clone, Serialize, Deserialize)]
struct RawClassSlot {
    day: Weekday,
    start: TimeOfDay,
    end: TimeOfDay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    blocked: bool,
}

/// One entry of the weekly timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClassSlot", into = "RawClassSlot")]
pub struct ClassSlot {
    pub window: TimeWindow,
    pub subject: Option<String>,
    pub blocked: bool,
}

impl TryFrom<RawClassSlot> for ClassSlot {
    type Error = ValidationError;

    fn try_from(raw: RawClassSlot) -> Result<Self, Self::Error> {
        Ok(ClassSlot {
            window: TimeWindow::new(raw.day, raw.start, raw.end)?,
            subject: raw.subject,
            blocked: raw.blocked,
        })
    }
}

impl From<ClassSlot> for RawClassSlot {
    fn from(slot: ClassSlot) -> Self {
        RawClassSlot {
            day: slot.window.day(),
            start: slot.window.start(),
            end: slot.window.end(),
            subject: slot.subject,
            blocked: slot.blocked,
        }
    }
}

impl ClassSlot {
    /// A class with a subject.
    pub fn class(window: TimeWindow, subject: impl Into<String>) -> Self {
        Self {
            window,
            subject: Some(subject.into()),
            blocked: false,
        }
    }

    /// A window the student wants kept empty.
    pub fn reserved(window: TimeWindow) -> Self {
        Self {
            window,
            subject: None,
            blocked: true,
        }
    }

    /// Whether this slot counts as an occupied class period.
    pub fn is_class(&self) -> bool {
        !self.blocked
            && self
                .subject
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty())
    }
}

/// The part of each weekday that may be used for coursework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingBound(pub DayRange);

impl WorkingBound {
    pub fn range(&self) -> DayRange {
        self.0
    }
}

impl Default for WorkingBound {
    /// 09:00-18:00
    fn default() -> Self {
        Self(DayRange::new_unchecked(
            TimeOfDay::new_unchecked(9 * 60),
            TimeOfDay::new_unchecked(18 * 60),
        ))
    }
}

/// Free intervals per weekday, each list ascending and non-overlapping.
///
/// Every weekday is present; a day without capacity maps to an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTimeMap(BTreeMap<Weekday, Vec<DayRange>>);

impl Default for FreeTimeMap {
    fn default() -> Self {
        Self(Weekday::ALL.iter().map(|d| (*d, Vec::new())).collect())
    }
}

impl FreeTimeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a day's intervals. They are sorted and merged on the way in.
    pub fn set(&mut self, day: Weekday, ranges: Vec<DayRange>) {
        self.0.insert(day, merge_ranges(ranges));
    }

    pub fn with_day(mut self, day: Weekday, ranges: Vec<DayRange>) -> Self {
        self.set(day, ranges);
        self
    }

    pub fn get(&self, day: Weekday) -> &[DayRange] {
        self.0.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn get_mut(&mut self, day: Weekday) -> &mut Vec<DayRange> {
        self.0.entry(day).or_default()
    }

    pub fn total_minutes(&self, day: Weekday) -> u32 {
        self.get(day).iter().map(DayRange::duration_minutes).sum()
    }

    pub fn total_minutes_all(&self) -> u32 {
        Weekday::ALL.iter().map(|d| self.total_minutes(*d)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

/// Derives per-weekday free intervals from a timetable.
pub struct FreeTimeCalculator {
    bound: WorkingBound,
}

impl FreeTimeCalculator {
    /// Create a calculator with the default 09:00-18:00 bound
    pub fn new() -> Self {
        Self {
            bound: WorkingBound::default(),
        }
    }

    pub fn with_bound(bound: WorkingBound) -> Self {
        Self { bound }
    }

    /// Compute the free intervals for every weekday.
    pub fn compute(&self, slots: &[ClassSlot]) -> FreeTimeMap {
        let mut map = FreeTimeMap::new();
        for day in Weekday::ALL {
            let free = self.free_on(day, slots);
            tracing::debug!(
                day = %day,
                intervals = free.len(),
                minutes = free.iter().map(DayRange::duration_minutes).sum::<u32>(),
                "computed free time"
            );
            map.set(day, free);
        }
        map
    }

    fn free_on(&self, day: Weekday, slots: &[ClassSlot]) -> Vec<DayRange> {
        let bound = self.bound.range();
        let on_day = slots.iter().filter(|s| s.window.day() == day);

        let (classes, reserved): (Vec<&ClassSlot>, Vec<&ClassSlot>) =
            on_day.partition(|s| s.is_class());
        let occupied = merge_ranges(classes.iter().map(|s| s.window.range()).collect());

        let mut free = Vec::new();
        let mut cursor = bound.start();
        for period in &occupied {
            if period.end() <= cursor {
                continue;
            }
            if period.start() >= bound.end() {
                break;
            }
            if let Ok(gap) = DayRange::new(cursor, period.start().min(bound.end())) {
                free.push(gap);
            }
            cursor = period.end().min(bound.end());
        }
        if let Ok(tail) = DayRange::new(cursor, bound.end()) {
            free.push(tail);
        }

        let cuts: Vec<DayRange> = reserved.iter().map(|s| s.window.range()).collect();
        subtract_all(&free, &cuts)
    }
}

impl Default for FreeTimeCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Free intervals per weekday within `bound`.
pub fn compute_free_time(slots: &[ClassSlot], bound: WorkingBound) -> FreeTimeMap {
    FreeTimeCalculator::with_bound(bound).compute(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: &str, end: &str) -> DayRange {
        DayRange::parse(start, end).unwrap()
    }

    fn class(day: Weekday, start: &str, end: &str) -> ClassSlot {
        ClassSlot::class(TimeWindow::on(day, r(start, end)), "Algorithms")
    }

    #[test]
    fn empty_day_spans_whole_bound() {
        let map = compute_free_time(&[], WorkingBound::default());
        for day in Weekday::ALL {
            assert_eq!(map.get(day), &[r("09:00", "18:00")]);
        }
        assert_eq!(map.total_minutes_all(), 5 * 540);
    }

    #[test]
    fn classes_carve_gaps_before_between_and_after() {
        let slots = vec![
            class(Weekday::Mon, "13:00", "14:00"),
            class(Weekday::Mon, "09:00", "10:00"),
        ];
        let map = compute_free_time(&slots, WorkingBound::default());
        assert_eq!(map.get(Weekday::Mon), &[r("10:00", "13:00"), r("14:00", "18:00")]);
        assert_eq!(map.get(Weekday::Tue), &[r("09:00", "18:00")]);
    }

    #[test]
    fn overlapping_and_touching_classes_merge() {
        let slots = vec![
            class(Weekday::Wed, "10:00", "11:00"),
            class(Weekday::Wed, "11:00", "12:00"),
            class(Weekday::Wed, "11:30", "13:00"),
        ];
        let map = compute_free_time(&slots, WorkingBound::default());
        assert_eq!(map.get(Weekday::Wed), &[r("09:00", "10:00"), r("13:00", "18:00")]);
    }

    #[test]
    fn classes_outside_bound_are_clipped() {
        let slots = vec![
            class(Weekday::Thu, "08:00", "09:30"),
            class(Weekday::Thu, "17:30", "19:00"),
        ];
        let map = compute_free_time(&slots, WorkingBound::default());
        assert_eq!(map.get(Weekday::Thu), &[r("09:30", "17:30")]);
    }

    #[test]
    fn fully_booked_day_is_empty() {
        let slots = vec![class(Weekday::Fri, "08:00", "19:00")];
        let map = compute_free_time(&slots, WorkingBound::default());
        assert!(map.get(Weekday::Fri).is_empty());
        assert_eq!(map.total_minutes(Weekday::Fri), 0);
    }

    #[test]
    fn reserved_slots_are_not_classes_but_stay_empty() {
        let reserved = ClassSlot::reserved(TimeWindow::on(Weekday::Mon, r("15:00", "16:00")));
        let untitled = ClassSlot {
            window: TimeWindow::on(Weekday::Mon, r("11:00", "12:00")),
            subject: Some("  ".into()),
            blocked: false,
        };
        assert!(!reserved.is_class());
        assert!(!untitled.is_class());

        let map = compute_free_time(&[reserved, untitled], WorkingBound::default());
        assert_eq!(
            map.get(Weekday::Mon),
            &[r("09:00", "11:00"), r("12:00", "15:00"), r("16:00", "18:00")]
        );
    }

    #[test]
    fn custom_bound_is_respected() {
        let bound = WorkingBound(r("08:00", "22:00"));
        let map = compute_free_time(&[class(Weekday::Tue, "10:00", "12:00")], bound);
        assert_eq!(map.get(Weekday::Tue), &[r("08:00", "10:00"), r("12:00", "22:00")]);
    }

    #[test]
    fn class_slot_json_shape() {
        let json = r#"{"day":"Mon","start":"09:00","end":"10:00","subject":"Data Structures"}"#;
        let slot: ClassSlot = serde_json::from_str(json).unwrap();
        assert!(slot.is_class());
        assert_eq!(serde_json::to_string(&slot).unwrap(), json);

        let bad = r#"{"day":"Mon","start":"10:00","end":"09:00"}"#;
        assert!(serde_json::from_str::<ClassSlot>(bad).is_err());
    }
}
