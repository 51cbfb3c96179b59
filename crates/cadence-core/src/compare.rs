//! Timezone-safe comparisons over mixed date / date-time values.
//!
//! A bare date compared against a timed value spans its whole day: as an
//! upper bound it behaves like end-of-day, as a lower bound like start of
//! day. This is what makes a filter such as "scheduled on or before today"
//! match a task timed for 14:00 today.

use chrono::NaiveTime;

use crate::civil::CivilDateTime;

/// True when the date portions fall on the same calendar day, ignoring any
/// time-of-day on either side.
pub fn is_same_calendar_day(a: &CivilDateTime, b: &CivilDateTime) -> bool {
    a.date() == b.date()
}

/// Time-aware strict "before".
///
/// Both timed: full date-time comparison. A bare side spans `[00:00, 24:00)`
/// of its day, so a timed value on day D is before bare D (any time beats
/// end-of-day), and bare D is before a timed value on day D unless that
/// value is exactly midnight.
pub fn is_before_time_aware(a: &CivilDateTime, b: &CivilDateTime) -> bool {
    match (a.time(), b.time()) {
        (Some(ta), Some(tb)) => (a.date(), ta) < (b.date(), tb),
        // Bare upper bound: treated as end-of-day.
        (Some(_), None) => a.date() <= b.date(),
        // Bare lower bound: treated as start-of-day.
        (None, Some(tb)) => {
            a.date() < b.date() || (a.date() == b.date() && tb > NaiveTime::MIN)
        }
        (None, None) => a.date() < b.date(),
    }
}

/// The composite exposed to filter callers.
///
/// `is_before_time_aware` alone disagrees with calendar-day equality at
/// exact-midnight boundaries, so both checks are OR-ed: a value is "on or
/// before" a bound if it is time-aware-before it or on the same calendar
/// day.
pub fn is_on_or_before(a: &CivilDateTime, b: &CivilDateTime) -> bool {
    is_before_time_aware(a, b) || is_same_calendar_day(a, b)
}
