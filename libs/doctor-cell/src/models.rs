use std::fmt;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    #[serde(alias = "monday")]
    Monday,
    #[serde(alias = "tuesday")]
    Tuesday,
    #[serde(alias = "wednesday")]
    Wednesday,
    #[serde(alias = "thursday")]
    Thursday,
    #[serde(alias = "friday")]
    Friday,
    #[serde(alias = "saturday")]
    Saturday,
    #[serde(alias = "sunday")]
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        };
        write!(f, "{}", name)
    }
}

/// A declared recurring window. Bounds are wall-clock labels such as "09:00";
/// they are stored as given and never validated on write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilitySlot {
    pub day: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl AvailabilitySlot {
    pub fn new(day: DayOfWeek, start_time: &str, end_time: &str) -> Self {
        Self {
            day,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            is_available: true,
        }
    }

    /// True when the slot is enabled and `start <= time < end`.
    /// Slots whose bounds do not parse as `HH:MM` never cover anything.
    pub fn covers(&self, time: NaiveTime) -> bool {
        if !self.is_available {
            return false;
        }

        match (parse_wall_clock(&self.start_time), parse_wall_clock(&self.end_time)) {
            (Some(start), Some(end)) => start <= time && time < end,
            _ => false,
        }
    }
}

pub fn parse_wall_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAvailabilityRequest {
    pub available_slots: Vec<AvailabilitySlot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub day: Option<DayOfWeek>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Not allowed to change this availability: {0}")]
    Forbidden(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_slot_covers_half_open_window() {
        let slot = AvailabilitySlot::new(DayOfWeek::Monday, "09:00", "17:00");
        assert!(slot.covers(at(9, 0)));
        assert!(slot.covers(at(16, 59)));
        assert!(!slot.covers(at(17, 0)));
        assert!(!slot.covers(at(8, 30)));
    }

    #[test]
    fn test_disabled_or_unparseable_slot_covers_nothing() {
        let mut slot = AvailabilitySlot::new(DayOfWeek::Monday, "09:00", "17:00");
        slot.is_available = false;
        assert!(!slot.covers(at(10, 0)));

        let garbage = AvailabilitySlot::new(DayOfWeek::Monday, "morning", "17:00");
        assert!(!garbage.covers(at(10, 0)));
    }

    #[test]
    fn test_slot_wire_format() {
        let slot: AvailabilitySlot = serde_json::from_value(serde_json::json!({
            "day": "Tuesday",
            "start_time": "10:00",
            "end_time": "18:00"
        }))
        .unwrap();

        assert_eq!(slot.day, DayOfWeek::Tuesday);
        assert!(slot.is_available);
        assert_eq!(DayOfWeek::from(Weekday::Sun).to_string(), "Sunday");
    }
}
