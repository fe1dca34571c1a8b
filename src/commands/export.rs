use crate::{
    commands::report::ReportQuery,
    libs::{
        export::{ExportFormat, Exporter},
        messages::Message,
    },
    msg_info,
};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    query: ReportQuery,

    #[arg(short, long, value_enum, default_value = "csv")]
    format: ExportFormat,

    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn cmd(args: ExportArgs) -> Result<()> {
    let report = args.query.run().await?;
    if report.is_empty() {
        msg_info!(Message::ReportEmpty);
    }

    Exporter::new(args.format, args.output).export(&report)
}
