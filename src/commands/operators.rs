use crate::{
    db::operators::Operators,
    libs::{messages::Message, view::View},
    msg_info, msg_print, msg_success, msg_warning,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct OperatorsArgs {
    #[command(subcommand)]
    command: OperatorsCommand,
}

#[derive(Debug, Subcommand)]
enum OperatorsCommand {
    /// Register one RFID card
    Add {
        rfid: String,
        name: String,
        #[arg(short, long)]
        remarks: Option<String>,
    },
    /// List registered operators
    List,
    /// Import a CSV with columns rfid_card_no,operator_name[,remarks]
    Import { file: PathBuf },
}

pub fn cmd(args: OperatorsArgs) -> Result<()> {
    let operators = Operators::new()?;

    match args.command {
        OperatorsCommand::Add { rfid, name, remarks } => {
            if operators.insert_if_absent(&rfid, &name, remarks.as_deref())? {
                msg_success!(Message::OperatorAdded(name));
            } else {
                msg_warning!(Message::OperatorExists(rfid));
            }
        }
        OperatorsCommand::List => {
            let all = operators.fetch_all()?;
            if all.is_empty() {
                msg_info!(Message::NoOperators);
            } else {
                msg_print!(Message::OperatorsHeader, true);
                View::operators(&all)?;
            }
        }
        OperatorsCommand::Import { file } => {
            let (added, skipped) = operators.import_csv(&file)?;
            msg_success!(Message::OperatorsImported { added, skipped });
        }
    }

    Ok(())
}
