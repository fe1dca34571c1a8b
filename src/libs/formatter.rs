//! Console formatting for report figures.
//!
//! Report documents carry hours as decimals; tables show them as `HH:MM`
//! next to the decimal so shift supervisors can read either.

use chrono::Duration;

/// Formats a duration as zero-padded `HH:MM`. Negative durations print as
/// `00:00`.
///
/// ```rust
/// use chrono::Duration;
/// use stitchlog::libs::formatter::format_duration;
///
/// assert_eq!(format_duration(&Duration::minutes(90)), "01:30");
/// assert_eq!(format_duration(&Duration::hours(-1)), "00:00");
/// ```
pub fn format_duration(duration: &Duration) -> String {
    let hours = duration.num_hours();
    let mins = duration.num_minutes() % 60;

    format!("{:02}:{:02}", hours.max(0), mins.max(0))
}

/// Decimal hours as `HH:MM`, rounded to the nearest minute.
///
/// ```rust
/// use stitchlog::libs::formatter::format_hours;
///
/// assert_eq!(format_hours(10.17), "10:10");
/// assert_eq!(format_hours(1.5833), "01:35");
/// ```
pub fn format_hours(hours: f64) -> String {
    let minutes = (hours * 60.0).round() as i64;
    format_duration(&Duration::minutes(minutes))
}

/// `12.5` becomes `"12.50%"`.
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Hours with both renderings, e.g. `"10.17 (10:10)"`.
pub fn format_hours_verbose(hours: f64) -> String {
    format!("{:.2} ({})", hours, format_hours(hours))
}
