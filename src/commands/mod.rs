//! Command-line surface.
//!
//! Each subcommand lives in its own module with a clap `Args` struct and a
//! `cmd` entry point. [`Cli::menu`] parses the arguments and dispatches.

pub mod export;
pub mod ingest;
pub mod init;
pub mod logs;
pub mod migrations;
pub mod modes;
pub mod operators;
pub mod report;
pub mod stats;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configure shift, taxonomy and ingestion settings")]
    Init(init::InitArgs),
    #[command(about = "Ingest machine log payloads from a JSON file or stdin")]
    Ingest(ingest::IngestArgs),
    #[command(about = "Productivity report by machine, line, operator or all")]
    Report(report::ReportArgs),
    #[command(about = "Export a productivity report to CSV, JSON or Excel")]
    Export(export::ExportArgs),
    #[command(about = "List stored log records")]
    Logs(logs::LogsArgs),
    #[command(about = "Fleet counts, line efficiency, operation metrics and duplicates")]
    Stats(stats::StatsArgs),
    #[command(about = "Manage RFID operators")]
    Operators(operators::OperatorsArgs),
    #[command(about = "Show mode taxonomies")]
    Modes(modes::ModesArgs),
    #[command(about = "Database schema status")]
    Migrations(migrations::MigrationsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Ingest(args) => ingest::cmd(args).await,
            Commands::Report(args) => report::cmd(args).await,
            Commands::Export(args) => export::cmd(args).await,
            Commands::Logs(args) => logs::cmd(args),
            Commands::Stats(args) => stats::cmd(args),
            Commands::Operators(args) => operators::cmd(args),
            Commands::Modes(args) => modes::cmd(args),
            Commands::Migrations(args) => migrations::cmd(args),
        }
    }
}
