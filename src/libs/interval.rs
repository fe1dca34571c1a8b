//! Interval normalizer: turns a raw log interval into hours that count.
//!
//! 1. Both endpoints are converted to seconds of day.
//! 2. An interval ending at or before the shift start, or starting at or
//!    after the shift end, contributes nothing.
//! 3. Otherwise both endpoints are clamped to the shift window and the
//!    remaining span becomes the duration.
//! 4. An interval whose raw endpoints both sit inside one break window
//!    contributes nothing. Partial overlap with a break is left alone here;
//!    breaks are taken out of the day total by the shift clock instead.
//!
//! Durations are never negative. There is no overnight wrap, so an interval
//! whose end precedes its start is worth 0 hours.

use crate::libs::log_record::LogRecord;
use crate::libs::shift::{to_seconds, ShiftConfig, SECONDS_PER_HOUR};
use tracing::debug;

/// A record paired with the hours it contributes.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedInterval<'a> {
    pub mode: i32,
    pub hours: f64,
    pub record: &'a LogRecord,
}

pub fn normalize<'a>(record: &'a LogRecord, shift: &ShiftConfig) -> NormalizedInterval<'a> {
    NormalizedInterval {
        mode: record.mode,
        hours: normalized_seconds(to_seconds(record.start_time), to_seconds(record.end_time), shift) / SECONDS_PER_HOUR,
        record,
    }
}

/// Normalizes every record and keeps only those with a positive duration.
pub fn normalize_all<'a, I>(records: I, shift: &ShiftConfig) -> Vec<NormalizedInterval<'a>>
where
    I: IntoIterator<Item = &'a LogRecord>,
{
    let mut total = 0usize;
    let normalized: Vec<NormalizedInterval<'a>> = records
        .into_iter()
        .inspect(|_| total += 1)
        .map(|record| normalize(record, shift))
        .filter(|interval| {
            if interval.hours <= 0.0 {
                debug!(
                    id = interval.record.id,
                    start = %interval.record.start_time,
                    end = %interval.record.end_time,
                    "Interval contributes no shift time"
                );
                return false;
            }
            true
        })
        .collect();

    debug!(total, kept = normalized.len(), "Normalized intervals");
    normalized
}

/// Seconds a `[start, end]` span contributes under `shift`.
pub fn normalized_seconds(start: u32, end: u32, shift: &ShiftConfig) -> f64 {
    let window = shift.shift_window();
    let (shift_start, shift_end) = (window.start_seconds(), window.end_seconds());

    if shift_end <= shift_start || end <= shift_start || start >= shift_end {
        return 0.0;
    }
    if shift.break_windows().iter().any(|brk| brk.contains(start, end)) {
        return 0.0;
    }

    let clipped_start = start.clamp(shift_start, shift_end);
    let clipped_end = end.clamp(shift_start, shift_end);
    clipped_end.saturating_sub(clipped_start) as f64
}
