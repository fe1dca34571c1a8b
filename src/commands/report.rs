use crate::{
    db::{db::Db, logs::MachineLogs, operators::Operators},
    libs::{
        aggregator::Dimension,
        config::Config,
        report::{load_report, parse_query_date, ProductivityReport, ReportRequest, Selector},
        view::View,
    },
};
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use clap::Args;

/// Report selection shared by `report` and `export`.
#[derive(Debug, Args)]
pub struct ReportQuery {
    /// Dimension to group by
    #[arg(value_enum)]
    by: Dimension,

    /// Machine id, line number or operator name; `all` or nothing selects
    /// every group and adds a summary
    value: Option<String>,

    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Last day included (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Mode taxonomy (defaults to the configured one)
    #[arg(short, long)]
    taxonomy: Option<String>,

    /// Evaluate as of this local time (YYYY-MM-DDTHH:MM:SS) instead of now
    #[arg(long)]
    at: Option<NaiveDateTime>,
}

impl ReportQuery {
    pub fn request(&self) -> Result<ReportRequest> {
        let from = self.from.as_deref().map(|v| parse_query_date("from_date", v)).transpose()?;
        let to = self.to.as_deref().map(|v| parse_query_date("to_date", v)).transpose()?;
        Ok(ReportRequest::new(self.by, Selector::parse(self.value.as_deref())).between(from, to))
    }

    /// Runs the query against the local database.
    pub async fn run(&self) -> Result<ProductivityReport> {
        let request = self.request()?;
        let config = Config::read()?;
        let taxonomy = config.taxonomy(self.taxonomy.as_deref())?;
        let now = self.at.unwrap_or_else(|| Local::now().naive_local());

        tokio::task::spawn_blocking(move || {
            let conn = Db::new()?.into_shared();
            let logs = MachineLogs::with_connection(conn.clone());
            let operators = Operators::with_connection(conn);
            load_report(&logs, &operators, &request, &config.shift, &taxonomy, now)
        })
        .await?
    }
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    query: ReportQuery,

    /// Print the report document as JSON
    #[arg(long)]
    json: bool,
}

pub async fn cmd(report_args: ReportArgs) -> Result<()> {
    let report = report_args.query.run().await?;

    if report_args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        View::report(&report)?;
    }

    Ok(())
}
