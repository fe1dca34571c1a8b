use crate::{
    db::{db::Db, logs::LogFilter, logs::MachineLogs, operators::Operators},
    libs::{config::Config, messages::Message, report::lookup_range, stats::describe_logs, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// First day (YYYY-MM-DD); requires --to
    #[arg(long)]
    from: Option<String>,

    /// Last day (YYYY-MM-DD); requires --from
    #[arg(long)]
    to: Option<String>,

    #[arg(long)]
    machine: Option<i64>,

    #[arg(long)]
    line: Option<i64>,

    /// Operator RFID card number
    #[arg(long)]
    operator: Option<String>,

    #[arg(long)]
    mode: Option<i32>,

    /// Taxonomy used for mode descriptions
    #[arg(short, long)]
    taxonomy: Option<String>,

    #[arg(long)]
    json: bool,
}

pub fn cmd(args: LogsArgs) -> Result<()> {
    let range = lookup_range(args.from.as_deref(), args.to.as_deref())?;
    let config = Config::read()?;
    let taxonomy = config.taxonomy(args.taxonomy.as_deref())?;

    let filter = LogFilter {
        from: range.map(|(from, _)| from),
        to: range.map(|(_, to)| to),
        machine_id: args.machine,
        line_number: args.line,
        operator_id: args.operator,
        mode: args.mode,
    };

    let conn = Db::new()?.into_shared();
    let records = MachineLogs::with_connection(conn.clone()).fetch(&filter)?;
    let names = Operators::with_connection(conn).name_map()?;
    let entries = describe_logs(records, &taxonomy, &names);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        msg_info!(Message::NoLogsFound);
        return Ok(());
    }

    msg_print!(Message::LogsHeader(entries.len()), true);
    View::logs(&entries)
}
