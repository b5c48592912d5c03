//! Half-open time windows and the interval arithmetic used on them.
//!
//! A [`DayRange`] is `[start, end)` within a single day with `start < end`;
//! a [`TimeWindow`] pins a range to a weekday. Both constructors reject
//! empty or inverted ranges, and deserialization goes through the same
//! checks, so every value in circulation has positive duration.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::time::{TimeOfDay, Weekday};

#[derive(Deserialize)]
struct RawRange {
    start: TimeOfDay,
    end: TimeOfDay,
}

/// A `[start, end)` interval within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct DayRange {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TryFrom<RawRange> for DayRange {
    type Error = ValidationError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        DayRange::new(raw.start, raw.end)
    }
}

impl DayRange {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub(crate) const fn new_unchecked(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Parse a pair of "HH:MM" strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        DayRange::new(start.parse()?, end.parse()?)
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.end.minutes() - self.start.minutes())
    }

    pub fn overlaps(&self, other: &DayRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Overlap or shared boundary; such ranges merge into one.
    pub fn touches(&self, other: &DayRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains(&self, other: &DayRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Intersection, kept only if it has positive duration.
    pub fn intersect(&self, other: &DayRange) -> Option<DayRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        DayRange::new(start, end).ok()
    }

    /// `self` minus `other`: zero, one or two pieces in ascending order.
    pub fn subtract(&self, other: &DayRange) -> Vec<DayRange> {
        if !self.overlaps(other) {
            return vec![*self];
        }
        let mut pieces = Vec::with_capacity(2);
        if let Ok(before) = DayRange::new(self.start, other.start) {
            pieces.push(before);
        }
        if let Ok(after) = DayRange::new(other.end, self.end) {
            pieces.push(after);
        }
        pieces
    }

    /// Remove `minutes` from the front. `None` when nothing is left.
    pub fn trim_front(&self, minutes: u32) -> Option<DayRange> {
        let start = self.start.checked_add(minutes)?;
        DayRange::new(start, self.end).ok()
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Sort ranges and merge any that overlap or touch.
pub fn merge_ranges(mut ranges: Vec<DayRange>) -> Vec<DayRange> {
    ranges.sort();
    let mut merged: Vec<DayRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if last.touches(&range) => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Remove every range in `cuts` from every range in `ranges`.
pub fn subtract_all(ranges: &[DayRange], cuts: &[DayRange]) -> Vec<DayRange> {
    cuts.iter().fold(ranges.to_vec(), |remaining, cut| {
        remaining.iter().flat_map(|r| r.subtract(cut)).collect()
    })
}

#[derive(Deserialize)]
struct RawWindow {
    day: Weekday,
    start: TimeOfDay,
    end: TimeOfDay,
}

/// A [`DayRange`] on a particular weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    day: Weekday,
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = ValidationError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.day, raw.start, raw.end)
    }
}

impl TimeWindow {
    pub fn new(day: Weekday, start: TimeOfDay, end: TimeOfDay) -> Result<Self, ValidationError> {
        Ok(TimeWindow::on(day, DayRange::new(start, end)?))
    }

    pub fn on(day: Weekday, range: DayRange) -> Self {
        Self {
            day,
            start: range.start,
            end: range.end,
        }
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn range(&self) -> DayRange {
        DayRange {
            start: self.start,
            end: self.end,
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        self.range().duration_minutes()
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.day == other.day && self.range().overlaps(&other.range())
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.day, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: &str, end: &str) -> DayRange {
        DayRange::parse(start, end).unwrap()
    }

    #[test]
    fn rejects_empty_and_inverted_ranges() {
        assert!(DayRange::parse("10:00", "10:00").is_err());
        assert!(matches!(
            DayRange::parse("11:00", "10:00"),
            Err(ValidationError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn intersection_requires_positive_overlap() {
        assert_eq!(r("09:00", "12:00").intersect(&r("11:00", "13:00")), Some(r("11:00", "12:00")));
        assert_eq!(r("09:00", "12:00").intersect(&r("12:00", "13:00")), None);
    }

    #[test]
    fn subtraction_splits_around_an_inner_cut() {
        let pieces = r("09:00", "18:00").subtract(&r("12:00", "13:00"));
        assert_eq!(pieces, vec![r("09:00", "12:00"), r("13:00", "18:00")]);
    }

    #[test]
    fn subtraction_handles_edges_and_full_cover() {
        assert_eq!(r("09:00", "12:00").subtract(&r("08:00", "10:00")), vec![r("10:00", "12:00")]);
        assert_eq!(r("09:00", "12:00").subtract(&r("11:00", "13:00")), vec![r("09:00", "11:00")]);
        assert!(r("09:00", "12:00").subtract(&r("08:00", "13:00")).is_empty());
        assert_eq!(r("09:00", "12:00").subtract(&r("12:00", "13:00")), vec![r("09:00", "12:00")]);
    }

    #[test]
    fn merge_joins_overlapping_and_touching_ranges() {
        let merged = merge_ranges(vec![
            r("13:00", "14:00"),
            r("09:00", "10:00"),
            r("10:00", "11:00"),
            r("13:30", "15:00"),
        ]);
        assert_eq!(merged, vec![r("09:00", "11:00"), r("13:00", "15:00")]);
    }

    #[test]
    fn trim_front_drops_exhausted_ranges() {
        assert_eq!(r("09:00", "12:00").trim_front(120), Some(r("11:00", "12:00")));
        assert_eq!(r("09:00", "12:00").trim_front(180), None);
    }

    #[test]
    fn deserialization_enforces_start_before_end() {
        let ok: TimeWindow =
            serde_json::from_str(r#"{"day":"Tue","start":"10:00","end":"12:00"}"#).unwrap();
        assert_eq!(ok.duration_minutes(), 120);
        assert!(serde_json::from_str::<TimeWindow>(r#"{"day":"Tue","start":"12:00","end":"10:00"}"#).is_err());
        assert!(serde_json::from_str::<DayRange>(r#"{"start":"12:00","end":"12:00"}"#).is_err());
    }
}
