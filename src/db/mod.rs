//! SQLite persistence for stitchlog.
//!
//! Every store wraps a [`SharedConnection`](db::SharedConnection), so the
//! log, operator and duplicate stores of one command can share a single
//! connection while tests open isolated databases by path.
//!
//! ```rust,no_run
//! use stitchlog::db::logs::{LogFilter, MachineLogs};
//!
//! let logs = MachineLogs::new()?;
//! let records = logs.fetch(&LogFilter::default())?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Stored log records are never updated or deleted.

/// Connection setup and migration on open.
pub mod db;

/// Audit trail of absorbed retransmissions.
pub mod duplicates;

/// Machine state intervals: append, atomic conditional append, bulk fetch.
pub mod logs;

/// Versioned schema migrations.
pub mod migrations;

/// RFID card to operator name lookup.
pub mod operators;
