//! Versioned schema migrations.
//!
//! Each migration runs once, in version order, and is recorded in the
//! `migrations` table. All pending migrations are applied in one transaction
//! every time a [`Db`](crate::db::db::Db) is opened.
//!
//! ```rust,no_run
//! use stitchlog::db::migrations::{get_db_version, init_with_migrations};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open("stitchlog.db")?;
//! init_with_migrations(&mut conn)?;
//! let version = get_db_version(&conn)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::libs::messages::Message;
use crate::{msg_debug, msg_error};
use anyhow::Result;
use rusqlite::{params, Connection, Transaction};

const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

/// Registry of every schema change, in the order it must be applied.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        // Version 1: machine state intervals, append-only
        self.add_migration(1, "create_machine_logs", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS machine_logs (
                    id INTEGER PRIMARY KEY,
                    machine_id INTEGER NOT NULL,
                    line_number INTEGER NOT NULL DEFAULT 0,
                    operator_id TEXT NOT NULL DEFAULT '0',
                    date DATE NOT NULL,
                    start_time TIME NOT NULL,
                    end_time TIME NOT NULL,
                    mode INTEGER NOT NULL,
                    stitch_count INTEGER NOT NULL DEFAULT 0,
                    needle_runtime REAL NOT NULL DEFAULT 0,
                    needle_stoptime REAL NOT NULL DEFAULT 0,
                    tx_log_id INTEGER NOT NULL DEFAULT 0,
                    str_log_id INTEGER NOT NULL DEFAULT 0,
                    device_id INTEGER NOT NULL DEFAULT 0,
                    reserve TEXT,
                    created_at TIMESTAMP NOT NULL DEFAULT (datetime(CURRENT_TIMESTAMP, 'localtime'))
                )",
                [],
            )?;

            tx.execute("CREATE INDEX IF NOT EXISTS idx_machine_logs_date ON machine_logs(date)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_machine_logs_mode ON machine_logs(mode)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_machine_logs_created_at ON machine_logs(created_at)", [])?;
            // Lookup path of the retransmission check
            tx.execute(
                "CREATE INDEX IF NOT EXISTS idx_machine_logs_dedup
                 ON machine_logs(machine_id, date, start_time, end_time, str_log_id)",
                [],
            )?;
            Ok(())
        });

        // Version 2: RFID card to operator name
        self.add_migration(2, "create_operators", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS operators (
                    id INTEGER PRIMARY KEY,
                    rfid_card_no TEXT NOT NULL UNIQUE,
                    operator_name TEXT NOT NULL,
                    remarks TEXT
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_operators_name ON operators(operator_name)", [])?;
            Ok(())
        });

        // Version 3: payloads of absorbed retransmissions
        self.add_migration(3, "create_duplicate_logs", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS duplicate_logs (
                    id INTEGER PRIMARY KEY,
                    payload TEXT NOT NULL,
                    created_at TIMESTAMP NOT NULL DEFAULT (datetime(CURRENT_TIMESTAMP, 'localtime'))
                )",
                [],
            )?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }

    /// Applies every migration newer than the recorded version.
    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        if pending.is_empty() {
            msg_debug!(Message::DatabaseUpToDate);
            return Ok(());
        }

        msg_debug!(Message::MigrationsFound(pending.len()));

        let tx = conn.transaction()?;

        for migration in pending {
            msg_debug!(Message::RunningMigration(migration.version, migration.name.to_string()));

            match (migration.up)(&tx) {
                Ok(()) => {
                    tx.execute(
                        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                        params![migration.version, migration.name],
                    )?;
                    msg_debug!(Message::MigrationCompleted(migration.version));
                }
                Err(e) => {
                    msg_error!(Message::MigrationFailed(migration.version, e.to_string()));
                    return Err(e);
                }
            }
        }

        tx.commit()?;
        msg_debug!(Message::AllMigrationsCompleted);

        Ok(())
    }

    /// Highest applied version, 0 for a fresh database.
    pub fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        let version: Option<u32> = conn
            .query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0))
            .unwrap_or(Some(0));

        Ok(version.unwrap_or(0))
    }

    pub fn is_migration_applied(&self, conn: &Connection, version: u32) -> Result<bool> {
        let count: i32 = conn.query_row("SELECT COUNT(*) FROM migrations WHERE version = ?1", params![version], |row| row.get(0))?;

        Ok(count > 0)
    }

    /// `(version, name, applied_at)` for every applied migration.
    pub fn get_migration_history(&self, conn: &Connection) -> Result<Vec<(u32, String, String)>> {
        conn.execute(MIGRATIONS_TABLE, [])?;
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;

        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(history)
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    MigrationManager::new().run_migrations(conn)
}

pub fn get_db_version(conn: &Connection) -> Result<u32> {
    MigrationManager::new().get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    Ok(manager.get_current_version(conn)? < manager.latest_version())
}
