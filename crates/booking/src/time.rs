//! Wall-clock times and calendar dates as bookings use them.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use turfbook_core::{DomainError, DomainResult, ValueObject};

const INVALID_TIME: &str = "Invalid time format. Please use HH:mm format";

// chrono's %H/%M also take single digits; fields must be two digits.
static TIME_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}(:\d{2})?$").expect("static regex"));

/// A time of day, written `HH:mm` (seconds are accepted on input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl ValueObject for TimeOfDay {}

impl TimeOfDay {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        if !TIME_SHAPE.is_match(raw) {
            return Err(DomainError::validation(INVALID_TIME));
        }
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map(Self)
            .map_err(|_| DomainError::validation(INVALID_TIME))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn seconds_from_midnight(&self) -> u32 {
        self.0.num_seconds_from_midnight()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }
}

impl core::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0.second() == 0 {
            write!(f, "{}", self.0.format("%H:%M"))
        } else {
            write!(f, "{}", self.0.format("%H:%M:%S"))
        }
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Length of `start..end` in hours.
///
/// Bookings never cross midnight, so `end` must be strictly later than `start`.
pub fn duration_hours(start: TimeOfDay, end: TimeOfDay) -> DomainResult<f64> {
    let secs = i64::from(end.seconds_from_midnight()) - i64::from(start.seconds_from_midnight());
    if secs <= 0 {
        return Err(DomainError::validation("End time must be after start time"));
    }
    Ok(secs as f64 / 3600.0)
}

/// A calendar day, written `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookingDate(NaiveDate);

impl ValueObject for BookingDate {}

impl BookingDate {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| DomainError::validation("Invalid date format. Please use YYYY-MM-DD format"))
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl core::fmt::Display for BookingDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for BookingDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BookingDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hh_mm_and_hh_mm_ss() {
        assert_eq!(TimeOfDay::parse("18:30").unwrap().to_string(), "18:30");
        assert_eq!(TimeOfDay::parse("07:05:09").unwrap().to_string(), "07:05:09");
        assert_eq!(TimeOfDay::parse(" 09:00 ").unwrap(), TimeOfDay::from_hm(9, 0).unwrap());
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in [
            "", "25:00", "12:60", "noon", "1800", "18h30", "-1:00", "9:5", "9:00", "18:7", "1:1:1", "18:00:0",
        ] {
            let err = TimeOfDay::parse(bad).unwrap_err();
            assert_eq!(err, DomainError::validation(INVALID_TIME), "{bad:?}");
        }
    }

    #[test]
    fn duration_in_fractional_hours() {
        let start = TimeOfDay::parse("18:00").unwrap();
        let end = TimeOfDay::parse("19:30").unwrap();
        assert_eq!(duration_hours(start, end).unwrap(), 1.5);
    }

    #[test]
    fn non_positive_duration_rejected() {
        let t = TimeOfDay::parse("10:00").unwrap();
        let earlier = TimeOfDay::parse("09:00").unwrap();
        assert!(duration_hours(t, t).is_err());
        assert_eq!(
            duration_hours(t, earlier).unwrap_err().to_string(),
            "End time must be after start time"
        );
    }

    #[test]
    fn serde_uses_wire_format() {
        let t: TimeOfDay = serde_json::from_str("\"06:00\"").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"06:00\"");
        assert!(serde_json::from_str::<TimeOfDay>("\"6pm\"").is_err());

        let d: BookingDate = serde_json::from_str("\"2024-03-09\"").unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"2024-03-09\"");
        assert!(BookingDate::parse("09/03/2024").is_err());
    }
}
