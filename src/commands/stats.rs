use crate::{
    db::{db::Db, duplicates::DuplicateLogs, logs::LogFilter, logs::MachineLogs, operators::Operators},
    libs::{
        config::Config,
        messages::Message,
        report::lookup_range,
        stats::{line_efficiency, operation_metrics, FleetCounts},
        view::View,
    },
    msg_info, msg_print,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    command: StatsCommand,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Args)]
struct RangeArgs {
    /// First day (YYYY-MM-DD); requires --to
    #[arg(long)]
    from: Option<String>,

    /// Last day (YYYY-MM-DD); requires --from
    #[arg(long)]
    to: Option<String>,
}

impl RangeArgs {
    fn filter(&self) -> Result<LogFilter> {
        let range = lookup_range(self.from.as_deref(), self.to.as_deref())?;
        Ok(LogFilter::between(range.map(|(from, _)| from), range.map(|(_, to)| to)))
    }
}

#[derive(Debug, Subcommand)]
enum StatsCommand {
    /// Distinct machines, lines and stored records
    Counts,
    /// Needle runtime share per production line
    Efficiency(RangeArgs),
    /// Sewing and rework stitches per machine within the shift
    Operations {
        /// Only this machine
        #[arg(short, long)]
        machine: Option<i64>,

        #[command(flatten)]
        range: RangeArgs,

        #[arg(short, long)]
        taxonomy: Option<String>,
    },
    /// Retransmissions absorbed by the ingestion gate
    Duplicates {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

pub fn cmd(args: StatsArgs) -> Result<()> {
    let conn = Db::new()?.into_shared();
    let logs = MachineLogs::with_connection(conn.clone());

    match args.command {
        StatsCommand::Counts => {
            let counts = FleetCounts {
                machines: logs.distinct_machine_count()?,
                lines: logs.distinct_line_count()?,
                logs: logs.count()?,
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                msg_print!(Message::FleetCountsHeader, true);
                View::fleet(&counts)?;
            }
        }
        StatsCommand::Efficiency(range) => {
            let lines = line_efficiency(&logs.fetch(&range.filter()?)?);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&lines)?);
            } else {
                msg_print!(Message::LineEfficiencyHeader, true);
                View::line_efficiency(&lines)?;
            }
        }
        StatsCommand::Operations { machine, range, taxonomy } => {
            let config = Config::read()?;
            let taxonomy = config.taxonomy(taxonomy.as_deref())?;
            let filter = LogFilter {
                machine_id: machine,
                ..range.filter()?
            };
            let records = logs.fetch(&filter)?;
            let names = Operators::with_connection(conn).name_map()?;
            let metrics = operation_metrics(&records, &config.shift, &taxonomy, &names);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                msg_print!(Message::OperationMetricsHeader, true);
                View::operations(&metrics)?;
            }
        }
        StatsCommand::Duplicates { limit } => {
            let duplicates = DuplicateLogs::with_connection(conn);
            let total = duplicates.count()?;
            if total == 0 {
                msg_info!(Message::NoDuplicates);
                return Ok(());
            }
            let recent = duplicates.fetch_recent(limit)?;
            if args.json {
                let payloads: Vec<_> = recent.iter().map(|d| &d.payload).collect();
                println!("{}", serde_json::to_string_pretty(&payloads)?);
            } else {
                msg_print!(Message::DuplicatesHeader(total), true);
                View::duplicates(&recent)?;
            }
        }
    }

    Ok(())
}
