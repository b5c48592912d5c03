//! Weekday and time-of-day primitives.
//!
//! Placement is restricted to the five weekdays, and times are kept as a
//! minute-of-day. Both serialize to the strings users type ("Mon", "09:30").

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Minutes in a day. `TimeOfDay` is always strictly below this.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Schedulable day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    /// Scan order used by the free-time calculator and the allocator.
    pub const ALL: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = ValidationError;

    /// Accepts English names and abbreviations in any case, and the
    /// single-character Korean day names timetables are often written with.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let day = match s.trim().to_lowercase().as_str() {
            "mon" | "monday" | "월" | "월요일" => Weekday::Mon,
            "tue" | "tues" | "tuesday" | "화" | "화요일" => Weekday::Tue,
            "wed" | "wednesday" | "수" | "수요일" => Weekday::Wed,
            "thu" | "thur" | "thurs" | "thursday" | "목" | "목요일" => Weekday::Thu,
            "fri" | "friday" | "금" | "금요일" => Weekday::Fri,
            _ => return Err(ValidationError::UnsupportedWeekday(s.to_string())),
        };
        Ok(day)
    }
}

impl TryFrom<String> for Weekday {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Weekday> for String {
    fn from(day: Weekday) -> Self {
        day.as_str().to_string()
    }
}

impl TryFrom<chrono::Weekday> for Weekday {
    type Error = ValidationError;

    fn try_from(day: chrono::Weekday) -> Result<Self, Self::Error> {
        match day {
            chrono::Weekday::Mon => Ok(Weekday::Mon),
            chrono::Weekday::Tue => Ok(Weekday::Tue),
            chrono::Weekday::Wed => Ok(Weekday::Wed),
            chrono::Weekday::Thu => Ok(Weekday::Thu),
            chrono::Weekday::Fri => Ok(Weekday::Fri),
            other => Err(ValidationError::UnsupportedWeekday(other.to_string())),
        }
    }
}

/// Minute of the day in `[0, 1440)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    /// 23:59, the latest representable time.
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay(MINUTES_PER_DAY - 1);

    pub(crate) const fn new_unchecked(minutes: u16) -> Self {
        Self(minutes)
    }

    pub fn from_minutes(minutes: u16) -> Result<Self, ValidationError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(ValidationError::InvalidTimeOfDay(format!("{minutes} minutes")));
        }
        Ok(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, ValidationError> {
        if hour >= 24 || minute >= 60 {
            return Err(ValidationError::InvalidTimeOfDay(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    /// Add minutes, or `None` if the result leaves the day.
    pub fn checked_add(&self, minutes: u32) -> Option<TimeOfDay> {
        let total = u32::from(self.0).checked_add(minutes)?;
        if total >= u32::from(MINUTES_PER_DAY) {
            return None;
        }
        Some(TimeOfDay(total as u16))
    }

    /// Round up to the next multiple of `grid` minutes.
    ///
    /// Already-aligned times are returned unchanged. The result saturates at
    /// 23:59 since midnight of the following day is not representable.
    pub fn ceil_to_grid(&self, grid: u16) -> TimeOfDay {
        if grid <= 1 {
            return *self;
        }
        let rounded = self.0.div_ceil(grid) * grid;
        TimeOfDay(rounded.min(MINUTES_PER_DAY - 1))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTimeOfDay(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u16 = h.parse().map_err(|_| invalid())?;
        let minute: u16 = m.parse().map_err(|_| invalid())?;
        TimeOfDay::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}
