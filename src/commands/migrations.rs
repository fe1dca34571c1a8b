use crate::{
    db::{
        db::Db,
        migrations::{get_db_version, needs_migration, MigrationManager},
    },
    libs::{messages::Message, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct MigrationsArgs {
    #[command(subcommand)]
    command: MigrationsCommand,
}

#[derive(Debug, Subcommand)]
enum MigrationsCommand {
    /// Current schema version and whether migrations are pending
    Status,
    /// Applied migrations
    History,
}

pub fn cmd(args: MigrationsArgs) -> Result<()> {
    let db = Db::new_without_migrations(Db::default_path()?)?;

    match args.command {
        MigrationsCommand::Status => {
            let version = get_db_version(&db.conn)?;
            let needs_update = needs_migration(&db.conn)?;

            msg_print!(Message::DatabaseVersion(version));
            if needs_update {
                msg_info!(Message::DatabaseNeedsUpdate);
            } else {
                msg_info!(Message::DatabaseUpToDate);
            }
        }
        MigrationsCommand::History => {
            let history = MigrationManager::new().get_migration_history(&db.conn)?;
            if history.is_empty() {
                msg_info!(Message::NoMigrationsApplied);
            } else {
                msg_print!(Message::MigrationHistory, true);
                View::migrations(&history)?;
            }
        }
    }

    Ok(())
}
