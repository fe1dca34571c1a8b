//! Shift clock: the working window, its breaks and the time they make available.
//!
//! All values are local wall-clock seconds since midnight in `[0, 86400)`.
//! There is no timezone handling and no overnight wrap: a shift and every
//! break live inside a single calendar day.
//!
//! ## Availability
//!
//! ```text
//! past day:  (shift_end - shift_start) - Σ break durations
//! today:     clamp(now, shift_start, shift_end) - shift_start
//!            - Σ durations of breaks whose end has already passed
//! future:    0
//! ```
//!
//! A break that is still running is not pro-rated. It is subtracted in full
//! once its end is reached and not at all before that.

use crate::libs::error::ConfigError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Converts a time of day to elapsed seconds since midnight.
pub fn to_seconds(time: NaiveTime) -> u32 {
    time.hour() * 3600 + time.minute() * 60 + time.second()
}

fn hms(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// A `[start, end]` wall-clock window within one day.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn start_seconds(&self) -> u32 {
        to_seconds(self.start)
    }

    pub fn end_seconds(&self) -> u32 {
        to_seconds(self.end)
    }

    /// Length of the window in seconds, 0 for an inverted window.
    pub fn duration_seconds(&self) -> u32 {
        self.end_seconds().saturating_sub(self.start_seconds())
    }

    /// True when both endpoints (in seconds) lie inside this window.
    pub fn contains(&self, start_seconds: u32, end_seconds: u32) -> bool {
        start_seconds >= self.start_seconds() && end_seconds <= self.end_seconds()
    }
}

/// Shift profile: the daily working window and the breaks inside it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ShiftConfig {
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default)]
    pub breaks: Vec<TimeWindow>,
}

impl Default for ShiftConfig {
    /// 08:25-19:35 with the three daily breaks, 10h10m of available time.
    fn default() -> Self {
        ShiftConfig {
            start: hms(8, 25),
            end: hms(19, 35),
            breaks: Self::standard_breaks(),
        }
    }
}

impl ShiftConfig {
    /// 08:30-19:30 with the same breaks, 10h of available time.
    pub fn legacy() -> Self {
        ShiftConfig {
            start: hms(8, 30),
            end: hms(19, 30),
            breaks: Self::standard_breaks(),
        }
    }

    fn standard_breaks() -> Vec<TimeWindow> {
        vec![
            TimeWindow::new(hms(10, 30), hms(10, 40)),
            TimeWindow::new(hms(13, 20), hms(14, 0)),
            TimeWindow::new(hms(16, 20), hms(16, 30)),
        ]
    }

    /// Looks up a built-in profile by name.
    pub fn profile(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" | "default" => Some(Self::default()),
            "legacy" => Some(Self::legacy()),
            _ => None,
        }
    }

    pub fn shift_window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    pub fn break_windows(&self) -> &[TimeWindow] {
        &self.breaks
    }

    /// Checks that the shift runs forward and every break sits inside it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = self.shift_window();
        if window.end_seconds() <= window.start_seconds() {
            return Err(ConfigError::InvertedShift {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        for brk in &self.breaks {
            if brk.end_seconds() <= brk.start_seconds() || !window.contains(brk.start_seconds(), brk.end_seconds()) {
                return Err(ConfigError::BreakOutsideShift {
                    start: brk.start.to_string(),
                    end: brk.end.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Shift length minus all breaks, the availability of any completed day.
    pub fn full_day_seconds(&self) -> f64 {
        available_seconds_for_day(NaiveDate::MIN, &self.shift_window(), &self.breaks, NaiveDateTime::MAX)
    }

    pub fn available_seconds_for_day(&self, day: NaiveDate, now: NaiveDateTime) -> f64 {
        available_seconds_for_day(day, &self.shift_window(), &self.breaks, now)
    }
}

/// Seconds of working time `day` offers, as seen at `now`.
///
/// `now` is supplied by the caller so the result is reproducible; its date
/// decides whether `day` is complete, in progress or still ahead.
pub fn available_seconds_for_day(day: NaiveDate, shift: &TimeWindow, breaks: &[TimeWindow], now: NaiveDateTime) -> f64 {
    let start = shift.start_seconds();
    let end = shift.end_seconds().max(start);
    let today = now.date();

    if day < today {
        let break_total: u32 = breaks.iter().map(TimeWindow::duration_seconds).sum();
        return (end - start).saturating_sub(break_total) as f64;
    }
    if day > today {
        return 0.0;
    }

    let now_seconds = to_seconds(now.time());
    let elapsed = now_seconds.clamp(start, end) - start;
    let passed_breaks: u32 = breaks
        .iter()
        .filter(|brk| brk.end_seconds() <= now_seconds)
        .map(TimeWindow::duration_seconds)
        .sum();

    elapsed.saturating_sub(passed_breaks) as f64
}
