//! Recurrence rules: descriptor parsing and closed-form grid evaluation.
//!
//! Rules are modeled as an explicit tagged structure over [`Frequency`] so
//! unsupported RFC-5545 fields (COUNT, UNTIL, positional BYDAY, ...) are
//! rejected at parse time instead of silently producing a wrong-but-plausible
//! occurrence. Evaluation computes grid offsets arithmetically; no operation
//! iterates one day or one week at a time, so INTERVAL=60 resolves exactly as
//! fast as INTERVAL=1.

use chrono::Weekday;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::civil::{days_in_month, CivilDate};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "DAILY"),
            Frequency::Weekly => write!(f, "WEEKLY"),
            Frequency::Monthly => write!(f, "MONTHLY"),
            Frequency::Yearly => write!(f, "YEARLY"),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

/// An open-ended recurrence grid: anchor date + frequency + interval, with
/// optional weekday / day-of-month restrictions.
///
/// Invariant: `interval >= 1`, `by_day` weekdays deduplicated and sorted
/// Monday-first, `by_month_day` entries in `1..=31`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    anchor: CivilDate,
    frequency: Frequency,
    interval: u32,
    by_day: Option<Vec<Weekday>>,
    by_month_day: Option<BTreeSet<u32>>,
}

impl RecurrenceRule {
    pub fn new(anchor: CivilDate, frequency: Frequency, interval: u32) -> Result<Self, CoreError> {
        if interval < 1 {
            return Err(CoreError::InvalidInterval(interval as i64));
        }
        Ok(Self {
            anchor,
            frequency,
            interval,
            by_day: None,
            by_month_day: None,
        })
    }

    /// Restricts weekly occurrences to the given weekdays.
    pub fn with_by_day(mut self, days: &[Weekday]) -> Self {
        let mut sorted: Vec<Weekday> = days.to_vec();
        sorted.sort_by_key(|d| d.num_days_from_monday());
        sorted.dedup();
        self.by_day = Some(sorted);
        self
    }

    /// Restricts monthly occurrences to the given days of month.
    pub fn with_by_month_day(mut self, days: &[u32]) -> Result<Self, CoreError> {
        let set: BTreeSet<u32> = days.iter().copied().collect();
        if let Some(bad) = set.iter().find(|d| **d < 1 || **d > 31) {
            return Err(CoreError::InvalidRule(format!("BYMONTHDAY out of range: {}", bad)));
        }
        self.by_month_day = Some(set);
        Ok(self)
    }

    /// Parses an RFC-5545-flavored descriptor:
    /// `DTSTART:<YYYYMMDD>;FREQ=<DAILY|WEEKLY|MONTHLY|YEARLY>;INTERVAL=<n>`
    /// with optional `BYDAY=` / `BYMONTHDAY=` parts.
    ///
    /// `INTERVAL` defaults to 1 when absent. Unsupported keys (COUNT, UNTIL,
    /// WKST, ...) are rejected rather than ignored.
    pub fn parse(descriptor: &str) -> Result<Self, CoreError> {
        let mut anchor: Option<CivilDate> = None;
        let mut frequency: Option<Frequency> = None;
        let mut interval: u32 = 1;
        let mut by_day: Option<Vec<Weekday>> = None;
        let mut by_month_day: Option<Vec<u32>> = None;

        for part in descriptor.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part
                .split_once(':')
                .or_else(|| part.split_once('='))
                .ok_or_else(|| CoreError::InvalidRule(format!("malformed part: {}", part)))?;
            match key.to_ascii_uppercase().as_str() {
                "DTSTART" => anchor = Some(parse_dtstart(value)?),
                "FREQ" => {
                    frequency = Some(
                        value
                            .parse::<Frequency>()
                            .map_err(|e| CoreError::InvalidRule(e.to_string()))?,
                    )
                }
                "INTERVAL" => {
                    let n: i64 = value
                        .parse()
                        .map_err(|_| CoreError::InvalidRule(format!("malformed INTERVAL: {}", value)))?;
                    if n < 1 || n > u32::MAX as i64 {
                        return Err(CoreError::InvalidInterval(n));
                    }
                    interval = n as u32;
                }
                "BYDAY" => by_day = Some(parse_by_day(value)?),
                "BYMONTHDAY" => by_month_day = Some(parse_by_month_day(value)?),
                other => {
                    return Err(CoreError::InvalidRule(format!("unsupported key: {}", other)))
                }
            }
        }

        let anchor = anchor.ok_or_else(|| CoreError::InvalidRule("missing DTSTART".into()))?;
        let frequency = frequency.ok_or_else(|| CoreError::InvalidRule("missing FREQ".into()))?;

        let mut rule = Self::new(anchor, frequency, interval)?;
        if let Some(days) = by_day {
            rule = rule.with_by_day(&days);
        }
        if let Some(days) = by_month_day {
            rule = rule.with_by_month_day(&days)?;
        }
        Ok(rule)
    }

    /// Storage-layer parse: a malformed descriptor means the task is treated
    /// as non-recurring, so the error collapses to `None`.
    pub fn parse_lenient(descriptor: &str) -> Option<Self> {
        Self::parse(descriptor).ok()
    }

    pub fn anchor(&self) -> CivilDate {
        self.anchor
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn by_day(&self) -> Option<&[Weekday]> {
        self.by_day.as_deref()
    }

    pub fn by_month_day(&self) -> Option<&BTreeSet<u32>> {
        self.by_month_day.as_ref()
    }

    /// The same rule re-based on a different anchor date. Used for
    /// completion-anchored tasks, whose grid floats from the last completion.
    pub fn re_anchored(&self, anchor: CivilDate) -> Self {
        Self {
            anchor,
            ..self.clone()
        }
    }

    /// `from` advanced by `n` whole grid steps (frequency x interval).
    pub fn advance_intervals(&self, from: CivilDate, n: u32) -> CivilDate {
        let n = n as i64;
        let interval = self.interval as i64;
        match self.frequency {
            Frequency::Daily => from.add_days(n * interval),
            Frequency::Weekly => from.add_days(n * interval * 7),
            Frequency::Monthly => from.add_months_clamped((n * interval) as i32),
            Frequency::Yearly => from.add_years((n * interval) as i32),
        }
    }

    /// The smallest occurrence date `>= reference` on this rule's grid.
    ///
    /// The anchor itself is always a valid occurrence, so
    /// `occurrence_on_or_after(anchor) == anchor`. Grid offsets are computed
    /// in closed form; the candidate scans below are bounded by the size of
    /// the BYDAY/BYMONTHDAY sets, never by the interval or the gap.
    pub fn occurrence_on_or_after(&self, reference: CivilDate) -> CivilDate {
        let reference = reference.max(self.anchor);
        match self.frequency {
            Frequency::Daily => {
                let step = self.interval as i64;
                let gap = reference.days_since(&self.anchor);
                self.anchor.add_days(ceil_multiple(gap, step))
            }
            Frequency::Weekly => match &self.by_day {
                None => {
                    let step = self.interval as i64 * 7;
                    let gap = reference.days_since(&self.anchor);
                    self.anchor.add_days(ceil_multiple(gap, step))
                }
                Some(days) => {
                    let anchor_ws = week_start(self.anchor);
                    let step_days = self.interval as i64 * 7;
                    let gap_weeks = week_start(reference).days_since(&anchor_ws) / 7;
                    let mut k = gap_weeks / self.interval as i64;
                    loop {
                        let ws = anchor_ws.add_days(k * step_days);
                        for wd in days {
                            let cand = ws.add_days(wd.num_days_from_monday() as i64);
                            if cand >= reference {
                                return cand;
                            }
                        }
                        k += 1;
                    }
                }
            },
            Frequency::Monthly => {
                let step = self.interval as i64;
                let anchor_mi = month_index(self.anchor);
                let gap = month_index(reference) - anchor_mi;
                let mut k = gap.max(0) / step;
                loop {
                    let (y, m) = ym_from_index(anchor_mi + k * step);
                    for day in self.month_day_candidates(y, m) {
                        if let Ok(cand) = CivilDate::new(y, m, day) {
                            if cand >= reference {
                                return cand;
                            }
                        }
                    }
                    k += 1;
                }
            }
            Frequency::Yearly => {
                let step = self.interval as i64;
                let gap = reference.year() as i64 - self.anchor.year() as i64;
                let mut k = gap.max(0) / step;
                loop {
                    let y = (self.anchor.year() as i64 + k * step) as i32;
                    let m = self.anchor.month();
                    let day = self.anchor.day().min(days_in_month(y, m));
                    if let Ok(cand) = CivilDate::new(y, m, day) {
                        if cand >= reference {
                            return cand;
                        }
                    }
                    k += 1;
                }
            }
        }
    }

    /// The largest occurrence date `<= reference`, or `None` when the
    /// reference precedes the anchor.
    pub fn occurrence_on_or_before(&self, reference: CivilDate) -> Option<CivilDate> {
        if reference < self.anchor {
            return None;
        }
        match self.frequency {
            Frequency::Daily => {
                let step = self.interval as i64;
                let gap = reference.days_since(&self.anchor);
                Some(self.anchor.add_days((gap / step) * step))
            }
            Frequency::Weekly => match &self.by_day {
                None => {
                    let step = self.interval as i64 * 7;
                    let gap = reference.days_since(&self.anchor);
                    Some(self.anchor.add_days((gap / step) * step))
                }
                Some(days) => {
                    let anchor_ws = week_start(self.anchor);
                    let step_days = self.interval as i64 * 7;
                    let gap_weeks = week_start(reference).days_since(&anchor_ws) / 7;
                    let mut k = gap_weeks / self.interval as i64;
                    while k >= 0 {
                        let ws = anchor_ws.add_days(k * step_days);
                        for wd in days.iter().rev() {
                            let cand = ws.add_days(wd.num_days_from_monday() as i64);
                            if cand <= reference && cand >= self.anchor {
                                return Some(cand);
                            }
                        }
                        k -= 1;
                    }
                    None
                }
            },
            Frequency::Monthly => {
                let step = self.interval as i64;
                let anchor_mi = month_index(self.anchor);
                let gap = month_index(reference) - anchor_mi;
                let mut k = gap.max(0) / step;
                while k >= 0 {
                    let (y, m) = ym_from_index(anchor_mi + k * step);
                    for day in self.month_day_candidates(y, m).into_iter().rev() {
                        if let Ok(cand) = CivilDate::new(y, m, day) {
                            if cand <= reference && cand >= self.anchor {
                                return Some(cand);
                            }
                        }
                    }
                    k -= 1;
                }
                None
            }
            Frequency::Yearly => {
                let step = self.interval as i64;
                let gap = reference.year() as i64 - self.anchor.year() as i64;
                let mut k = gap.max(0) / step;
                while k >= 0 {
                    let y = (self.anchor.year() as i64 + k * step) as i32;
                    let m = self.anchor.month();
                    let day = self.anchor.day().min(days_in_month(y, m));
                    if let Ok(cand) = CivilDate::new(y, m, day) {
                        if cand <= reference && cand >= self.anchor {
                            return Some(cand);
                        }
                    }
                    k -= 1;
                }
                None
            }
        }
    }

    /// Candidate days within one grid month, ascending. BYMONTHDAY entries
    /// clamp to the month length (31 -> Feb 28/29), same policy as
    /// `add_months_clamped`, so every grid month yields an occurrence.
    fn month_day_candidates(&self, year: i32, month: u32) -> Vec<u32> {
        let dim = days_in_month(year, month);
        match &self.by_month_day {
            Some(days) => {
                let clamped: BTreeSet<u32> = days.iter().map(|d| (*d).min(dim)).collect();
                clamped.into_iter().collect()
            }
            None => vec![self.anchor.day().min(dim)],
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DTSTART:{:04}{:02}{:02};FREQ={};INTERVAL={}",
            self.anchor.year(),
            self.anchor.month(),
            self.anchor.day(),
            self.frequency,
            self.interval
        )?;
        if let Some(days) = &self.by_day {
            let tokens: Vec<&str> = days.iter().map(|d| weekday_token(*d)).collect();
            write!(f, ";BYDAY={}", tokens.join(","))?;
        }
        if let Some(days) = &self.by_month_day {
            let tokens: Vec<String> = days.iter().map(|d| d.to_string()).collect();
            write!(f, ";BYMONTHDAY={}", tokens.join(","))?;
        }
        Ok(())
    }
}

impl FromStr for RecurrenceRule {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RecurrenceRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecurrenceRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

/// Parses the `DTSTART` value: exactly eight digits, `YYYYMMDD`.
fn parse_dtstart(value: &str) -> Result<CivilDate, CoreError> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidRule(format!("malformed DTSTART: {}", value)));
    }
    let year: i32 = value[0..4]
        .parse()
        .map_err(|_| CoreError::InvalidRule(format!("malformed DTSTART: {}", value)))?;
    let month: u32 = value[4..6]
        .parse()
        .map_err(|_| CoreError::InvalidRule(format!("malformed DTSTART: {}", value)))?;
    let day: u32 = value[6..8]
        .parse()
        .map_err(|_| CoreError::InvalidRule(format!("malformed DTSTART: {}", value)))?;
    CivilDate::new(year, month, day)
        .map_err(|_| CoreError::InvalidRule(format!("DTSTART not a calendar date: {}", value)))
}

fn parse_by_day(value: &str) -> Result<Vec<Weekday>, CoreError> {
    value
        .split(',')
        .map(|token| match token.trim().to_ascii_uppercase().as_str() {
            "MO" => Ok(Weekday::Mon),
            "TU" => Ok(Weekday::Tue),
            "WE" => Ok(Weekday::Wed),
            "TH" => Ok(Weekday::Thu),
            "FR" => Ok(Weekday::Fri),
            "SA" => Ok(Weekday::Sat),
            "SU" => Ok(Weekday::Sun),
            // Positional prefixes (1MO, -1FR) are out of scope: reject.
            other => Err(CoreError::InvalidRule(format!("unsupported BYDAY token: {}", other))),
        })
        .collect()
}

fn parse_by_month_day(value: &str) -> Result<Vec<u32>, CoreError> {
    value
        .split(',')
        .map(|token| {
            let n: u32 = token
                .trim()
                .parse()
                .map_err(|_| CoreError::InvalidRule(format!("malformed BYMONTHDAY: {}", token)))?;
            if !(1..=31).contains(&n) {
                return Err(CoreError::InvalidRule(format!("BYMONTHDAY out of range: {}", n)));
            }
            Ok(n)
        })
        .collect()
}

fn weekday_token(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Monday of the week containing `d` (RFC 5545 default week start).
fn week_start(d: CivilDate) -> CivilDate {
    d.add_days(-(d.weekday().num_days_from_monday() as i64))
}

/// Smallest multiple of `step` that is `>= gap`, for `gap >= 0`.
fn ceil_multiple(gap: i64, step: i64) -> i64 {
    if gap <= 0 {
        0
    } else {
        ((gap + step - 1) / step) * step
    }
}

/// Months since year 0, for grid-month arithmetic.
fn month_index(d: CivilDate) -> i64 {
    d.year() as i64 * 12 + (d.month() as i64 - 1)
}

fn ym_from_index(mi: i64) -> (i32, u32) {
    (mi.div_euclid(12) as i32, (mi.rem_euclid(12) + 1) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> CivilDate {
        CivilDate::from_storage_string(s).unwrap()
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_minimal() {
            let rule = RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY").unwrap();
            assert_eq!(rule.anchor(), date("2026-02-08"));
            assert_eq!(rule.frequency(), Frequency::Daily);
            assert_eq!(rule.interval(), 1); // INTERVAL defaults to 1
        }

        #[test]
        fn test_parse_with_interval() {
            let rule = RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;INTERVAL=60").unwrap();
            assert_eq!(rule.interval(), 60);
        }

        #[test]
        fn test_parse_by_day() {
            let rule = RecurrenceRule::parse("DTSTART:20260202;FREQ=WEEKLY;BYDAY=WE,MO").unwrap();
            assert_eq!(rule.by_day(), Some(&[Weekday::Mon, Weekday::Wed][..]));
        }

        #[test]
        fn test_parse_by_month_day() {
            let rule =
                RecurrenceRule::parse("DTSTART:20260101;FREQ=MONTHLY;BYMONTHDAY=1,15").unwrap();
            assert_eq!(
                rule.by_month_day().unwrap().iter().copied().collect::<Vec<_>>(),
                vec![1, 15]
            );
        }

        #[test]
        fn test_parse_rejects_zero_or_negative_interval() {
            let err = RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;INTERVAL=0").unwrap_err();
            assert_eq!(err, CoreError::InvalidInterval(0));
            let err = RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;INTERVAL=-3").unwrap_err();
            assert_eq!(err, CoreError::InvalidInterval(-3));
        }

        #[test]
        fn test_parse_rejects_unsupported_keys() {
            assert!(matches!(
                RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;COUNT=10"),
                Err(CoreError::InvalidRule(_))
            ));
            assert!(matches!(
                RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;UNTIL=20270101"),
                Err(CoreError::InvalidRule(_))
            ));
            // Positional BYDAY is not modeled either.
            assert!(matches!(
                RecurrenceRule::parse("DTSTART:20260208;FREQ=WEEKLY;BYDAY=1MO"),
                Err(CoreError::InvalidRule(_))
            ));
        }

        #[test]
        fn test_parse_rejects_malformed() {
            assert!(RecurrenceRule::parse("").is_err());
            assert!(RecurrenceRule::parse("FREQ=DAILY").is_err()); // missing DTSTART
            assert!(RecurrenceRule::parse("DTSTART:20260208").is_err()); // missing FREQ
            assert!(RecurrenceRule::parse("DTSTART:2026-02-08;FREQ=DAILY").is_err());
            assert!(RecurrenceRule::parse("DTSTART:20260230;FREQ=DAILY").is_err());
            assert!(RecurrenceRule::parse("DTSTART:20260208;FREQ=HOURLY").is_err());
        }

        #[test]
        fn test_parse_lenient_collapses_errors() {
            assert!(RecurrenceRule::parse_lenient("garbage").is_none());
            assert!(RecurrenceRule::parse_lenient("DTSTART:20260208;FREQ=DAILY").is_some());
        }

        #[test]
        fn test_display_round_trips() {
            for descriptor in [
                "DTSTART:20260208;FREQ=DAILY;INTERVAL=60",
                "DTSTART:20260202;FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR",
                "DTSTART:20260131;FREQ=MONTHLY;INTERVAL=1;BYMONTHDAY=1,15,31",
                "DTSTART:20240229;FREQ=YEARLY;INTERVAL=4",
            ] {
                let rule = RecurrenceRule::parse(descriptor).unwrap();
                assert_eq!(rule.to_string(), descriptor);
                assert_eq!(RecurrenceRule::parse(&rule.to_string()).unwrap(), rule);
            }
        }
    }

    mod evaluator_tests {
        use super::*;

        #[test]
        fn test_anchor_is_an_occurrence() {
            let rule = RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;INTERVAL=60").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-08")), date("2026-02-08"));
        }

        #[test]
        fn test_reference_before_anchor_returns_anchor() {
            let rule = RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;INTERVAL=60").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2020-01-01")), date("2026-02-08"));
        }

        #[test]
        fn test_daily_interval_60() {
            let rule = RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;INTERVAL=60").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-09")), date("2026-04-09"));
            assert_eq!(rule.occurrence_on_or_after(date("2026-04-09")), date("2026-04-09"));
            assert_eq!(rule.occurrence_on_or_after(date("2026-04-10")), date("2026-06-08"));
        }

        #[test]
        fn test_daily_common_case() {
            let rule = RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;INTERVAL=1").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-09")), date("2026-02-09"));
        }

        #[test]
        fn test_weekly_interval_20() {
            // 2026-02-08 is a Sunday; 20 weeks = 140 days later is 2026-06-28.
            let rule = RecurrenceRule::parse("DTSTART:20260208;FREQ=WEEKLY;INTERVAL=20").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-09")), date("2026-06-28"));
        }

        #[test]
        fn test_weekly_by_day() {
            // Anchor Monday 2026-02-02, Mon+Thu each week.
            let rule =
                RecurrenceRule::parse("DTSTART:20260202;FREQ=WEEKLY;BYDAY=MO,TH").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-02")), date("2026-02-02"));
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-03")), date("2026-02-05"));
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-06")), date("2026-02-09"));
        }

        #[test]
        fn test_weekly_by_day_with_interval() {
            // Anchor Monday 2026-02-02, every 2 weeks on Mon+Fri.
            let rule =
                RecurrenceRule::parse("DTSTART:20260202;FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR")
                    .unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-03")), date("2026-02-06"));
            // The off week is skipped entirely.
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-07")), date("2026-02-16"));
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-17")), date("2026-02-20"));
        }

        #[test]
        fn test_weekly_by_day_before_anchor_in_anchor_week() {
            // Anchor Wednesday 2026-02-04; the Monday of that week is not an
            // occurrence because it precedes the anchor.
            let rule =
                RecurrenceRule::parse("DTSTART:20260204;FREQ=WEEKLY;BYDAY=MO,WE").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-02")), date("2026-02-04"));
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-05")), date("2026-02-09"));
        }

        #[test]
        fn test_monthly_clamps_short_months() {
            let rule = RecurrenceRule::parse("DTSTART:20260131;FREQ=MONTHLY").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-01")), date("2026-02-28"));
            assert_eq!(rule.occurrence_on_or_after(date("2026-03-01")), date("2026-03-31"));
        }

        #[test]
        fn test_monthly_interval() {
            let rule = RecurrenceRule::parse("DTSTART:20260115;FREQ=MONTHLY;INTERVAL=3").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2026-01-16")), date("2026-04-15"));
            assert_eq!(rule.occurrence_on_or_after(date("2026-04-16")), date("2026-07-15"));
        }

        #[test]
        fn test_monthly_by_month_day() {
            let rule =
                RecurrenceRule::parse("DTSTART:20260101;FREQ=MONTHLY;BYMONTHDAY=1,15").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2026-01-02")), date("2026-01-15"));
            assert_eq!(rule.occurrence_on_or_after(date("2026-01-16")), date("2026-02-01"));
        }

        #[test]
        fn test_monthly_by_month_day_clamps() {
            let rule =
                RecurrenceRule::parse("DTSTART:20260131;FREQ=MONTHLY;BYMONTHDAY=31").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2026-02-01")), date("2026-02-28"));
        }

        #[test]
        fn test_yearly() {
            let rule = RecurrenceRule::parse("DTSTART:20240229;FREQ=YEARLY").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2024-03-01")), date("2025-02-28"));
            let rule = RecurrenceRule::parse("DTSTART:20240229;FREQ=YEARLY;INTERVAL=4").unwrap();
            assert_eq!(rule.occurrence_on_or_after(date("2024-03-01")), date("2028-02-29"));
        }

        #[test]
        fn test_on_or_before_basic() {
            let rule = RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;INTERVAL=60").unwrap();
            assert_eq!(rule.occurrence_on_or_before(date("2026-02-07")), None);
            assert_eq!(
                rule.occurrence_on_or_before(date("2026-02-08")),
                Some(date("2026-02-08"))
            );
            assert_eq!(
                rule.occurrence_on_or_before(date("2026-05-01")),
                Some(date("2026-04-09"))
            );
        }

        #[test]
        fn test_on_or_before_weekly_by_day() {
            let rule =
                RecurrenceRule::parse("DTSTART:20260204;FREQ=WEEKLY;BYDAY=MO,WE").unwrap();
            // Monday of the anchor week precedes the anchor: no occurrence.
            assert_eq!(rule.occurrence_on_or_before(date("2026-02-03")), None);
            assert_eq!(
                rule.occurrence_on_or_before(date("2026-02-10")),
                Some(date("2026-02-09"))
            );
        }

        #[test]
        fn test_on_or_before_inverse_of_on_or_after() {
            let rule =
                RecurrenceRule::parse("DTSTART:20260202;FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR")
                    .unwrap();
            let mut reference = date("2026-02-02");
            for _ in 0..12 {
                let occ = rule.occurrence_on_or_after(reference);
                assert_eq!(rule.occurrence_on_or_before(occ), Some(occ));
                reference = occ.add_days(1);
            }
        }

        #[test]
        fn test_advance_intervals() {
            let daily = RecurrenceRule::parse("DTSTART:20260208;FREQ=DAILY;INTERVAL=60").unwrap();
            assert_eq!(daily.advance_intervals(date("2026-02-08"), 1), date("2026-04-09"));
            let weekly = RecurrenceRule::parse("DTSTART:20260208;FREQ=WEEKLY;INTERVAL=20").unwrap();
            assert_eq!(weekly.advance_intervals(date("2026-02-08"), 1), date("2026-06-28"));
            let monthly = RecurrenceRule::parse("DTSTART:20260131;FREQ=MONTHLY").unwrap();
            assert_eq!(monthly.advance_intervals(date("2026-01-31"), 1), date("2026-02-28"));
        }
    }
}
