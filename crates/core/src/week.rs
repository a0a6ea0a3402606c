//! # Week Module
//!
//! Week boundaries and the reporting blackout.
//!
//! A week starts at local midnight on a configured weekday and ends one
//! second before the next week starts. Its id is the `%Y-W%W` label of the start date: two
//! consecutive week starts are exactly seven days apart, so they always
//! straddle one Monday and never share a label.

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One accountability week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    pub week_id: String,
    /// Inclusive
    pub start: DateTime<FixedOffset>,
    /// Inclusive
    pub end: DateTime<FixedOffset>,
}

impl WeekWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start.with_timezone(&Utc) && at <= self.end.with_timezone(&Utc)
    }
}

impl fmt::Display for WeekWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} ~ {})",
            self.week_id,
            self.start.format("%m/%d"),
            self.end.format("%m/%d")
        )
    }
}

/// Local hours during which verifications are refused.
///
/// Half-open `[start_hour, end_hour)`. A range with `start_hour > end_hour`
/// wraps past midnight; `start_hour == end_hour` disables the blackout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl BlackoutWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> CoreResult<Self> {
        if start_hour > 23 || end_hour > 23 {
            return Err(CoreError::Validation(format!(
                "blackout hours out of range: {}-{}",
                start_hour, end_hour
            )));
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn disabled() -> Self {
        Self {
            start_hour: 0,
            end_hour: 0,
        }
    }

    pub fn contains_hour(&self, hour: u32) -> bool {
        match self.start_hour.cmp(&self.end_hour) {
            std::cmp::Ordering::Less => hour >= self.start_hour && hour < self.end_hour,
            std::cmp::Ordering::Greater => hour >= self.start_hour || hour < self.end_hour,
            std::cmp::Ordering::Equal => false,
        }
    }
}

impl Default for BlackoutWindow {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 4,
        }
    }
}

/// Timezone of the community: an IANA zone, or a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl LocalZone {
    /// `Asia/Seoul`, `UTC`, or an offset such as `+09:00`
    pub fn parse(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        if let Ok(tz) = trimmed.parse::<Tz>() {
            return Ok(Self::Named(tz));
        }
        trimmed
            .parse::<FixedOffset>()
            .map(Self::Fixed)
            .map_err(|_| CoreError::InvalidTimezone(s.to_string()))
    }

    /// Local time of an instant, with the offset in effect at that instant
    pub fn to_local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Self::Named(tz) => at.with_timezone(tz).fixed_offset(),
            Self::Fixed(offset) => at.with_timezone(offset),
        }
    }

    /// Instant of a local wall-clock time.
    ///
    /// A repeated time resolves to its first occurrence. A time skipped by a
    /// DST jump is read with the offset in effect before the jump, which lands
    /// just after it.
    pub fn resolve(&self, local: NaiveDateTime) -> DateTime<FixedOffset> {
        match self {
            Self::Fixed(offset) => (local - Duration::seconds(i64::from(offset.local_minus_utc())))
                .and_utc()
                .with_timezone(offset),
            Self::Named(tz) => match tz.from_local_datetime(&local).earliest() {
                Some(at) => at.fixed_offset(),
                None => {
                    let before = tz.offset_from_utc_datetime(&(local - Duration::days(1))).fix();
                    let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
                    tz.from_utc_datetime(&utc).fixed_offset()
                }
            },
        }
    }
}

impl From<Tz> for LocalZone {
    fn from(tz: Tz) -> Self {
        Self::Named(tz)
    }
}

impl From<FixedOffset> for LocalZone {
    fn from(offset: FixedOffset) -> Self {
        Self::Fixed(offset)
    }
}

impl fmt::Display for LocalZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(tz) => f.write_str(tz.name()),
            Self::Fixed(offset) => write!(f, "UTC{}", offset),
        }
    }
}

/// Week arithmetic in the community's local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCalendar {
    pub zone: LocalZone,
    pub week_start: Weekday,
    pub blackout: BlackoutWindow,
}

impl WeekCalendar {
    pub fn new(zone: impl Into<LocalZone>, week_start: Weekday, blackout: BlackoutWindow) -> Self {
        Self {
            zone: zone.into(),
            week_start,
            blackout,
        }
    }

    /// Convert an instant into local time
    pub fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        self.zone.to_local(at)
    }

    /// Local calendar date of an instant
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        self.local(at).date_naive()
    }

    /// Week containing `at`
    pub fn window_at(&self, at: DateTime<Utc>) -> WeekWindow {
        let date = self.local_date(at);
        let days_since_start = (date.weekday().num_days_from_monday() + 7
            - self.week_start.num_days_from_monday())
            % 7;
        let start_date = date - Duration::days(i64::from(days_since_start));

        // Across a DST change a week is an hour shorter or longer than 7 days.
        let start = self.zone.resolve(start_date.and_time(NaiveTime::MIN));
        let next = self
            .zone
            .resolve((start_date + Duration::days(7)).and_time(NaiveTime::MIN));
        let end = self.local((next - Duration::seconds(1)).with_timezone(&Utc));

        WeekWindow {
            week_id: start_date.format("%Y-W%W").to_string(),
            start,
            end,
        }
    }

    /// Week containing the clock's "now"
    pub fn current_week(&self, clock: &dyn Clock) -> WeekWindow {
        self.window_at(clock.now())
    }

    /// Week that ended immediately before the current one
    pub fn previous_week(&self, clock: &dyn Clock) -> WeekWindow {
        self.previous(&self.current_week(clock))
    }

    /// Week that ended immediately before `window`
    pub fn previous(&self, window: &WeekWindow) -> WeekWindow {
        self.window_at((window.start - Duration::seconds(1)).with_timezone(&Utc))
    }

    /// The already finished week labelled `week_id`.
    ///
    /// Malformed labels, labels no week carries, and the current or a later
    /// week are rejected.
    pub fn ended_week(&self, week_id: &str, clock: &dyn Clock) -> CoreResult<WeekWindow> {
        let year = label_year(week_id)
            .ok_or_else(|| CoreError::Validation(format!("not a week id: {}", week_id)))?;

        // Labels are zero padded, so they sort in calendar order.
        let current = self.current_week(clock);
        if week_id >= current.week_id.as_str() {
            return Err(CoreError::Validation(format!(
                "week {} has not ended yet",
                week_id
            )));
        }

        let mut window = self.previous(&current);
        while window.start.year() >= year {
            if window.week_id == week_id {
                return Ok(window);
            }
            window = self.previous(&window);
        }
        Err(CoreError::Validation(format!("no week is labelled {}", week_id)))
    }

    /// True if `at` falls in the blackout hours
    pub fn is_blackout(&self, at: DateTime<Utc>) -> bool {
        self.blackout.contains_hour(self.local(at).hour())
    }

    /// Reject `at` with `BlackoutRejected` when it is in the blackout hours
    pub fn check_reporting_allowed(&self, at: DateTime<Utc>) -> CoreResult<()> {
        if self.is_blackout(at) {
            return Err(CoreError::BlackoutRejected {
                local_time: self.local(at).format("%Y-%m-%d %H:%M").to_string(),
                start_hour: self.blackout.start_hour,
                end_hour: self.blackout.end_hour,
            });
        }
        Ok(())
    }
}

impl Default for WeekCalendar {
    /// Asia/Seoul, weeks starting Sunday, no reports between 00:00 and 04:00
    fn default() -> Self {
        Self {
            zone: LocalZone::Named(Tz::Asia__Seoul),
            week_start: Weekday::Sun,
            blackout: BlackoutWindow::default(),
        }
    }
}

/// Year of a `YYYY-Www` label
fn label_year(week_id: &str) -> Option<i32> {
    let (year, week) = week_id.split_once("-W")?;
    let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(year, 4) || !digits(week, 2) {
        return None;
    }
    year.parse().ok()
}
