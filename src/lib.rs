//! # Stitchlog - sewing machine logs to shift productivity reports
//!
//! Industrial sewing machines report one event per operational interval: a
//! start and end time, a numeric mode and production counters. Stitchlog
//! stores those events and turns them into shift-bounded productivity
//! reports per operator, machine and production line.
//!
//! ## Features
//!
//! - **Ingestion gate**: per-field validation and an atomic retransmission
//!   dedup policy
//! - **Shift accounting**: configurable shift window and breaks, with the
//!   in-progress day counted up to a caller-supplied "now"
//! - **Mode taxonomies**: named, swappable code-to-category mappings
//! - **Reports**: one aggregation engine for every grouping dimension, with
//!   an hours-weighted cross-group summary
//! - **Export**: reports as CSV, JSON or Excel
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stitchlog::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
