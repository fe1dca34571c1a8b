use crate::{
    db::logs::MachineLogs,
    libs::{
        config::Config,
        ingest::{IngestGate, IngestResponse, LogPayload},
        messages::Message,
    },
    msg_bail_anyhow, msg_error_anyhow, msg_info,
};
use anyhow::Result;
use clap::Args;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// JSON file holding one payload object or an array of them; `-` or
    /// nothing reads stdin
    file: Option<PathBuf>,

    /// Mode taxonomy used to validate MODE (defaults to the configured one)
    #[arg(short, long)]
    taxonomy: Option<String>,
}

/// Feeds every payload through the ingestion gate and prints the response
/// document for each, in input order.
pub async fn cmd(args: IngestArgs) -> Result<()> {
    let text = read_input(args.file.as_deref())?;
    let (payloads, single) = parse_payloads(&text)?;

    let config = Config::read()?;
    let taxonomy = config.taxonomy(args.taxonomy.as_deref())?;

    let responses = tokio::task::spawn_blocking(move || -> Result<Vec<IngestResponse>> {
        let logs = MachineLogs::new()?;
        let gate = IngestGate::new(&taxonomy, &config.ingest);
        Ok(gate.respond_all(&payloads, &logs))
    })
    .await??;

    if single {
        if let Some(response) = responses.first() {
            println!("{}", serde_json::to_string_pretty(response)?);
            if let IngestResponse::Failed { message, .. } = response {
                msg_bail_anyhow!(Message::IngestFailed(message.clone()));
            }
        }
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&responses)?);

    let mut created = 0;
    let mut duplicates = 0;
    let mut rejected = 0;
    let mut failed = 0;
    for response in &responses {
        match response {
            IngestResponse::Ack { code: 201, .. } => created += 1,
            IngestResponse::Ack { .. } => duplicates += 1,
            IngestResponse::Rejected { .. } => rejected += 1,
            IngestResponse::Failed { .. } => failed += 1,
        }
    }
    msg_info!(Message::IngestBatchSummary {
        created,
        duplicates,
        rejected,
        failed
    });

    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => {
            if !path.exists() {
                msg_bail_anyhow!(Message::FileNotFound(path.display().to_string()));
            }
            Ok(std::fs::read_to_string(path)?)
        }
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Returns the payloads and whether the input was a single object.
fn parse_payloads(text: &str) -> Result<(Vec<LogPayload>, bool)> {
    let value: Value = serde_json::from_str(text).map_err(|e| msg_error_anyhow!(Message::InvalidPayloadJson(e.to_string())))?;

    let (items, single) = match value {
        Value::Array(items) => (items, false),
        object @ Value::Object(_) => (vec![object], true),
        _ => msg_bail_anyhow!(Message::PayloadNotObject),
    };

    let payloads = items
        .into_iter()
        .map(|item| -> Result<LogPayload> {
            match item {
                Value::Object(_) => Ok(serde_json::from_value(item)?),
                _ => Err(msg_error_anyhow!(Message::PayloadNotObject)),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((payloads, single))
}
