//! User time preferences and the filter that applies them to free time.

use serde::{Deserialize, Serialize};

use crate::time::Weekday;
use crate::timetable::FreeTimeMap;
use crate::window::{merge_ranges, subtract_all, DayRange};

/// Preferred and avoided windows, applied to every weekday.
///
/// An empty `preferred` list means no restriction beyond the working bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub preferred: Vec<DayRange>,
    #[serde(default)]
    pub avoid: Vec<DayRange>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefer(mut self, range: DayRange) -> Self {
        self.preferred.push(range);
        self
    }

    pub fn avoid(mut self, range: DayRange) -> Self {
        self.avoid.push(range);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.preferred.is_empty() && self.avoid.is_empty()
    }

    /// Narrow one day's free intervals.
    pub fn apply(&self, free: &[DayRange]) -> Vec<DayRange> {
        let narrowed = if self.preferred.is_empty() {
            free.to_vec()
        } else {
            let preferred = merge_ranges(self.preferred.clone());
            free.iter()
                .flat_map(|f| preferred.iter().filter_map(move |p| f.intersect(p)))
                .collect()
        };
        merge_ranges(subtract_all(&narrowed, &self.avoid))
    }
}

/// Restrict every weekday's free time to the preferred windows, then remove
/// the avoided ones. Days left without capacity map to an empty list.
pub fn filter_by_preferences(free: &FreeTimeMap, preferences: &Preferences) -> FreeTimeMap {
    let mut filtered = FreeTimeMap::new();
    for day in Weekday::ALL {
        let ranges = preferences.apply(free.get(day));
        tracing::debug!(
            day = %day,
            before = free.get(day).len(),
            after = ranges.len(),
            "applied preferences"
        );
        filtered.set(day, ranges);
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: &str, end: &str) -> DayRange {
        DayRange::parse(start, end).unwrap()
    }

    fn whole_week(ranges: Vec<DayRange>) -> FreeTimeMap {
        Weekday::ALL
            .iter()
            .fold(FreeTimeMap::new(), |m, d| m.with_day(*d, ranges.clone()))
    }

    #[test]
    fn empty_preferences_pass_through() {
        let free = whole_week(vec![r("09:00", "12:00"), r("13:00", "18:00")]);
        assert_eq!(filter_by_preferences(&free, &Preferences::new()), free);
    }

    #[test]
    fn avoid_window_splits_an_interval() {
        let free = whole_week(vec![r("09:00", "18:00")]);
        let prefs = Preferences::new().avoid(r("12:00", "13:00"));
        let filtered = filter_by_preferences(&free, &prefs);
        assert_eq!(filtered.get(Weekday::Mon), &[r("09:00", "12:00"), r("13:00", "18:00")]);
    }

    #[test]
    fn preferred_windows_intersect_free_time() {
        let free = whole_week(vec![r("09:00", "11:00"), r("14:00", "18:00")]);
        let prefs = Preferences::new()
            .prefer(r("10:00", "15:00"))
            .prefer(r("17:00", "20:00"));
        let filtered = filter_by_preferences(&free, &prefs);
        assert_eq!(
            filtered.get(Weekday::Wed),
            &[r("10:00", "11:00"), r("14:00", "15:00"), r("17:00", "18:00")]
        );
    }

    #[test]
    fn overlapping_preferred_windows_do_not_duplicate_capacity() {
        let free = whole_week(vec![r("09:00", "18:00")]);
        let prefs = Preferences::new()
            .prefer(r("09:00", "12:00"))
            .prefer(r("11:00", "13:00"));
        let filtered = filter_by_preferences(&free, &prefs);
        assert_eq!(filtered.get(Weekday::Tue), &[r("09:00", "13:00")]);
        assert_eq!(filtered.total_minutes(Weekday::Tue), 240);
    }

    #[test]
    fn filtering_everything_leaves_empty_days() {
        let free = whole_week(vec![r("09:00", "12:00")]);
        let prefs = Preferences::new().prefer(r("13:00", "15:00"));
        let filtered = filter_by_preferences(&free, &prefs);
        assert!(filtered.is_empty());
        assert!(filtered.get(Weekday::Fri).is_empty());
    }

    #[test]
    fn filter_is_idempotent() {
        let free = whole_week(vec![r("09:00", "18:00")]);
        let prefs = Preferences::new()
            .prefer(r("08:00", "16:00"))
            .avoid(r("12:00", "13:30"));
        let once = filter_by_preferences(&free, &prefs);
        assert_eq!(filter_by_preferences(&once, &prefs), once);
    }
}
