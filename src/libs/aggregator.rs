//! Aggregator: folds normalized intervals into productivity totals.
//!
//! One reduction serves every grouping level. Callers pick a grouping key
//! extractor ([`Dimension::key_of`] or any closure) and the same algorithm
//! runs once per group, then once more over the union for the summary.
//!
//! ```text
//! available     = Σ available_seconds_for_day(d) / 3600  over distinct dates
//! untracked     = max(available - productive - tracked_npt, 0)
//! productive %  = productive / available * 100, clamped to [0, 100]
//! npt %         = clamp(npt / available * 100, 0, 100 - productive %)
//! needle %      = (Σ productive needle_runtime / 3600) / productive * 100
//! ```
//!
//! Every division by a zero denominator yields 0.

use crate::libs::interval::NormalizedInterval;
use crate::libs::log_record::LogRecord;
use crate::libs::modes::{ModeCategory, ModeTaxonomy, NonProductiveKind};
use crate::libs::shift::{ShiftConfig, SECONDS_PER_HOUR};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// What a report groups by.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Machine,
    Line,
    Operator,
    All,
}

impl Dimension {
    pub fn key_of(&self, record: &LogRecord) -> GroupKey {
        match self {
            Dimension::Machine => GroupKey::Machine(record.machine_id),
            Dimension::Line => GroupKey::Line(record.line_number),
            Dimension::Operator => GroupKey::Operator(record.operator_id.clone()),
            Dimension::All => GroupKey::All,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Machine => "machine",
            Dimension::Line => "line",
            Dimension::Operator => "operator",
            Dimension::All => "all",
        };
        write!(f, "{}", name)
    }
}

/// Serialized tagged by dimension: `{"machine": 1}`, `{"operator": "0012"}`
/// or `"all"`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Machine(i64),
    Line(i64),
    Operator(String),
    All,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Machine(id) => write!(f, "Machine {}", id),
            GroupKey::Line(number) => write!(f, "Line {}", number),
            GroupKey::Operator(rfid) => write!(f, "{}", rfid),
            GroupKey::All => write!(f, "All"),
        }
    }
}

/// Reduced metrics for one slice of intervals. Values are unrounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub mode_hours: BTreeMap<i32, f64>,
    pub available_hours: f64,
    pub productive_hours: f64,
    pub tracked_nonproductive_hours: f64,
    pub untracked_idle_hours: f64,
    /// Explicitly coded idle plus untracked idle.
    pub idle_hours: f64,
    /// Tracked non-productive plus untracked idle.
    pub nonproductive_hours: f64,
    pub productive_percentage: f64,
    pub npt_percentage: f64,
    pub stitch_count: i64,
    pub sewing_speed: f64,
    pub needle_runtime_hours: f64,
    pub needle_runtime_percentage: f64,
    pub working_days: usize,
}

impl Totals {
    /// Hours actually logged under any mode.
    pub fn logged_hours(&self) -> f64 {
        self.mode_hours.values().sum()
    }
}

/// The intervals of one group and their reduction.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub key: GroupKey,
    pub intervals: Vec<NormalizedInterval<'a>>,
    pub totals: Totals,
}

pub struct Aggregator<'c> {
    taxonomy: &'c ModeTaxonomy,
    shift: &'c ShiftConfig,
    now: NaiveDateTime,
}

impl<'c> Aggregator<'c> {
    pub fn new(taxonomy: &'c ModeTaxonomy, shift: &'c ShiftConfig, now: NaiveDateTime) -> Self {
        Self { taxonomy, shift, now }
    }

    pub fn taxonomy(&self) -> &ModeTaxonomy {
        self.taxonomy
    }

    pub fn shift(&self) -> &ShiftConfig {
        self.shift
    }

    /// Available seconds over the distinct dates present in `intervals`.
    pub fn available_seconds(&self, intervals: &[NormalizedInterval<'_>]) -> f64 {
        distinct_dates(intervals)
            .into_iter()
            .map(|day| self.shift.available_seconds_for_day(day, self.now))
            .sum()
    }

    /// Reduces one group, counting availability over its own dates.
    pub fn reduce(&self, intervals: &[NormalizedInterval<'_>]) -> Totals {
        self.reduce_with_availability(intervals, self.available_seconds(intervals))
    }

    pub fn reduce_with_availability(&self, intervals: &[NormalizedInterval<'_>], available_seconds: f64) -> Totals {
        let mut totals = Totals {
            available_hours: available_seconds / SECONDS_PER_HOUR,
            working_days: distinct_dates(intervals).len(),
            ..Totals::default()
        };

        let mut explicit_idle = 0.0;
        let mut needle_seconds = 0.0;
        let mut speed_sum = 0.0;
        let mut speed_samples = 0usize;

        for interval in intervals {
            *totals.mode_hours.entry(interval.mode).or_insert(0.0) += interval.hours;
            totals.stitch_count += interval.record.stitch_count;

            match self.taxonomy.category_of(interval.mode) {
                ModeCategory::Productive => {
                    totals.productive_hours += interval.hours;
                    needle_seconds += interval.record.needle_runtime;
                    if let Some(speed) = interval.record.speed_sample() {
                        speed_sum += speed;
                        speed_samples += 1;
                    }
                }
                ModeCategory::NonProductive(kind) => {
                    totals.tracked_nonproductive_hours += interval.hours;
                    if kind == NonProductiveKind::Idle {
                        explicit_idle += interval.hours;
                    }
                }
            }
        }

        totals.untracked_idle_hours =
            (totals.available_hours - totals.productive_hours - totals.tracked_nonproductive_hours).max(0.0);
        totals.idle_hours = explicit_idle + totals.untracked_idle_hours;
        totals.nonproductive_hours = totals.tracked_nonproductive_hours + totals.untracked_idle_hours;

        let (productive_pct, npt_pct) =
            percentages(totals.productive_hours, totals.nonproductive_hours, totals.available_hours);
        totals.productive_percentage = productive_pct;
        totals.npt_percentage = npt_pct;

        totals.sewing_speed = ratio(speed_sum, speed_samples as f64);
        totals.needle_runtime_hours = needle_seconds / SECONDS_PER_HOUR;
        totals.needle_runtime_percentage = ratio(totals.needle_runtime_hours, totals.productive_hours) * 100.0;

        totals
    }

    /// Splits intervals by `key_fn` and reduces each group.
    pub fn group<'a, F>(&self, intervals: &[NormalizedInterval<'a>], key_fn: F) -> Vec<Group<'a>>
    where
        F: Fn(&LogRecord) -> GroupKey,
    {
        let mut buckets: BTreeMap<GroupKey, Vec<NormalizedInterval<'a>>> = BTreeMap::new();
        for interval in intervals {
            buckets.entry(key_fn(interval.record)).or_default().push(*interval);
        }

        buckets
            .into_iter()
            .map(|(key, intervals)| {
                let totals = self.reduce(&intervals);
                Group { key, intervals, totals }
            })
            .collect()
    }

    pub fn group_by<'a>(&self, intervals: &[NormalizedInterval<'a>], dimension: Dimension) -> Vec<Group<'a>> {
        self.group(intervals, |record| dimension.key_of(record))
    }

    /// One row per date, each reduced against that single day's availability.
    pub fn daily(&self, intervals: &[NormalizedInterval<'_>]) -> Vec<(NaiveDate, Totals)> {
        let mut by_date: BTreeMap<NaiveDate, Vec<NormalizedInterval<'_>>> = BTreeMap::new();
        for interval in intervals {
            by_date.entry(interval.record.date).or_default().push(*interval);
        }
        by_date
            .into_iter()
            .map(|(date, slice)| (date, self.reduce(&slice)))
            .collect()
    }

    /// Combined totals over all groups.
    ///
    /// The union is reduced with availability summed per group, so a date
    /// shared by two machines counts twice. Sewing speed and needle runtime
    /// percentage are averages of the group values weighted by each group's
    /// productive hours.
    pub fn summarize(&self, groups: &[Group<'_>]) -> Totals {
        let union: Vec<NormalizedInterval<'_>> = groups.iter().flat_map(|g| g.intervals.iter().copied()).collect();
        let available_seconds: f64 = groups.iter().map(|g| g.totals.available_hours * SECONDS_PER_HOUR).sum();

        let mut summary = self.reduce_with_availability(&union, available_seconds);

        let weight: f64 = groups.iter().map(|g| g.totals.productive_hours).sum();
        let weighted_speed: f64 = groups.iter().map(|g| g.totals.sewing_speed * g.totals.productive_hours).sum();
        let weighted_needle: f64 = groups
            .iter()
            .map(|g| g.totals.needle_runtime_percentage * g.totals.productive_hours)
            .sum();

        summary.sewing_speed = ratio(weighted_speed, weight);
        summary.needle_runtime_percentage = ratio(weighted_needle, weight);
        summary
    }
}

/// Productive and non-productive percentages with saturation applied.
pub fn percentages(productive_hours: f64, nonproductive_hours: f64, available_hours: f64) -> (f64, f64) {
    if available_hours <= 0.0 {
        return (0.0, 0.0);
    }
    if productive_hours > available_hours {
        return (100.0, 0.0);
    }
    let productive = (productive_hours / available_hours * 100.0).max(0.0).min(100.0);
    let npt = (nonproductive_hours / available_hours * 100.0).max(0.0).min(100.0 - productive);
    (productive, npt)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub fn distinct_dates(intervals: &[NormalizedInterval<'_>]) -> BTreeSet<NaiveDate> {
    intervals.iter().map(|i| i.record.date).collect()
}
