use crate::db::migrations::init_with_migrations;
use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const DB_FILE_NAME: &str = "stitchlog.db";

/// How long a writer waits for another connection's lock.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A connection shared by the stores of one process.
pub type SharedConnection = Arc<Mutex<Connection>>;

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the database in the data directory, applying pending migrations.
    pub fn new() -> Result<Db> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME)?;
        Self::open(db_file_path)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Db> {
        let mut db = Self::new_without_migrations(path)?;
        init_with_migrations(&mut db.conn)?;
        Ok(db)
    }

    /// Opens without touching the schema, for inspecting migration state.
    pub fn new_without_migrations(path: impl AsRef<Path>) -> Result<Db> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Db { conn })
    }

    pub fn default_path() -> Result<std::path::PathBuf> {
        DataStorage::new().get_path(DB_FILE_NAME)
    }

    pub fn into_shared(self) -> SharedConnection {
        Arc::new(Mutex::new(self.conn))
    }
}
