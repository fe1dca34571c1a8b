//! Core library modules.
//!
//! The time-accounting engine lives in [`shift`], [`interval`], [`modes`] and
//! [`aggregator`]; [`report`] shapes its output and [`ingest`] guards the
//! write path. The remaining modules are the ambient pieces around them:
//! configuration, storage location, console messages, tables and export.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use stitchlog::libs::shift::ShiftConfig;
//!
//! let shift = ShiftConfig::default();
//! let past = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let now = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! assert_eq!(shift.available_seconds_for_day(past, now), 36600.0);
//! ```

pub mod aggregator;
pub mod config;
pub mod data_storage;
pub mod error;
pub mod export;
pub mod formatter;
pub mod ingest;
pub mod interval;
pub mod log_record;
pub mod logging;
pub mod messages;
pub mod modes;
pub mod report;
pub mod shift;
pub mod stats;
pub mod view;
