//! Civil date model: calendar dates and date-times with no attached timezone.
//!
//! All recurrence arithmetic happens in civil-date space. The only place the
//! host clock is read is [`today`]; everything else takes explicit values.
//! UTC anchoring ([`CivilDate::to_utc_anchor`]) exists purely so a calendar
//! date round-trips to the same `YYYY-MM-DD` string regardless of the host
//! timezone offset. It is never used to decide "what day is it now".

use chrono::{DateTime, Datelike, Duration, Local, Months, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A calendar date (year, month, day), always normalized.
///
/// Construction validates; arithmetic returns a new instance. Ordering is
/// plain calendar order, which makes `BTreeSet<CivilDate>` usable as an
/// exception-key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilDate(NaiveDate);

impl CivilDate {
    /// Creates a date, rejecting out-of-range month/day combinations.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CoreError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| CoreError::InvalidDate(format!("{:04}-{:02}-{:02}", year, month, day)))
    }

    /// Parses the storage form `"YYYY-MM-DD"`.
    ///
    /// Strict: exactly ten characters, zero-padded fields, valid calendar
    /// date. Anything else is an [`CoreError::InvalidDate`]; input is never
    /// coerced to another date.
    pub fn from_storage_string(s: &str) -> Result<Self, CoreError> {
        if s.len() != 10 {
            return Err(CoreError::InvalidDate(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| CoreError::InvalidDate(s.to_string()))
    }

    /// Formats the storage form `"YYYY-MM-DD"`.
    pub fn to_storage_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// The instant 00:00:00 UTC on this calendar date.
    ///
    /// Storage/transmission only. Displaying this instant in a
    /// negative-offset timezone shows the previous local day, which is
    /// exactly why it must not feed "current day" logic.
    pub fn to_utc_anchor(&self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Number of days in this date's month (28..=31).
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.0.year(), self.0.month())
    }

    pub fn add_days(&self, n: i64) -> Self {
        Self(self.0 + Duration::days(n))
    }

    /// Adds `n` months, clamping the day to the target month's length
    /// (Jan 31 + 1 month = Feb 28/29).
    pub fn add_months_clamped(&self, n: i32) -> Self {
        let shifted = if n >= 0 {
            self.0.checked_add_months(Months::new(n as u32))
        } else {
            self.0.checked_sub_months(Months::new(n.unsigned_abs()))
        };
        // Saturates at the edge of the representable range.
        shifted.map(Self).unwrap_or(*self)
    }

    /// Adds `n` years, clamping Feb 29 to Feb 28 in non-leap targets.
    pub fn add_years(&self, n: i32) -> Self {
        self.add_months_clamped(n.saturating_mul(12))
    }

    /// Signed whole-day delta `self - other`.
    pub fn days_since(&self, other: &CivilDate) -> i64 {
        self.0.signed_duration_since(other.0).num_days()
    }

    /// Three-way calendar comparison, ignoring any time-of-day.
    pub fn compare(&self, other: &CivilDate) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_storage_string())
    }
}

impl FromStr for CivilDate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_storage_string(s)
    }
}

impl Serialize for CivilDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_storage_string())
    }
}

impl<'de> Deserialize<'de> for CivilDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_storage_string(&s).map_err(de::Error::custom)
    }
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// The host's current local calendar date.
///
/// The single host-clock read in the crate. Callers pin a resolver to this
/// value once and pass explicit dates from there on.
pub fn today() -> CivilDate {
    CivilDate(Local::now().date_naive())
}

/// A civil date with an optional local time-of-day (hour/minute).
///
/// When the time is absent the value is a pure date. Serializes as
/// `"YYYY-MM-DD"` or `"YYYY-MM-DD HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CivilDateTime {
    date: CivilDate,
    time: Option<NaiveTime>,
}

impl CivilDateTime {
    /// A pure date with no time component.
    pub fn date_only(date: CivilDate) -> Self {
        Self { date, time: None }
    }

    /// A date anchored to a specific local hour and minute.
    pub fn with_time(date: CivilDate, hour: u32, minute: u32) -> Result<Self, CoreError> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| CoreError::InvalidDateTime(format!("{} {:02}:{:02}", date, hour, minute)))?;
        Ok(Self {
            date,
            time: Some(time),
        })
    }

    /// Parses `"YYYY-MM-DD"` or `"YYYY-MM-DD HH:MM"`.
    pub fn from_storage_string(s: &str) -> Result<Self, CoreError> {
        match s.split_once(' ') {
            None => Ok(Self::date_only(CivilDate::from_storage_string(s)?)),
            Some((date_part, time_part)) => {
                let date = CivilDate::from_storage_string(date_part)?;
                let time = NaiveTime::parse_from_str(time_part, "%H:%M")
                    .map_err(|_| CoreError::InvalidDateTime(s.to_string()))?;
                Ok(Self {
                    date,
                    time: Some(time),
                })
            }
        }
    }

    pub fn to_storage_string(&self) -> String {
        match self.time {
            None => self.date.to_storage_string(),
            Some(t) => format!("{} {}", self.date.to_storage_string(), t.format("%H:%M")),
        }
    }

    pub fn date(&self) -> CivilDate {
        self.date
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    /// Shifts the date by whole days, preserving the time component.
    pub fn shift_days(&self, n: i64) -> Self {
        Self {
            date: self.date.add_days(n),
            time: self.time,
        }
    }
}

impl From<CivilDate> for CivilDateTime {
    fn from(date: CivilDate) -> Self {
        Self::date_only(date)
    }
}

impl fmt::Display for CivilDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_storage_string())
    }
}

impl FromStr for CivilDateTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_storage_string(s)
    }
}

impl Serialize for CivilDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_storage_string())
    }
}

impl<'de> Deserialize<'de> for CivilDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_storage_string(&s).map_err(de::Error::custom)
    }
}
