use crate::db::db::{Db, SharedConnection};
use crate::libs::messages::Message;
use crate::msg_bail_anyhow;
use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const INSERT_OPERATOR: &str = "INSERT INTO operators (rfid_card_no, operator_name, remarks) VALUES (?1, ?2, ?3)";
const INSERT_OPERATOR_IF_ABSENT: &str =
    "INSERT OR IGNORE INTO operators (rfid_card_no, operator_name, remarks) VALUES (?1, ?2, ?3)";
const SELECT_ALL: &str = "SELECT id, rfid_card_no, operator_name, remarks FROM operators ORDER BY operator_name, id";
const SELECT_BY_NAME: &str =
    "SELECT id, rfid_card_no, operator_name, remarks FROM operators WHERE operator_name = ?1 ORDER BY id LIMIT 1";
const SELECT_BY_RFID: &str = "SELECT id, rfid_card_no, operator_name, remarks FROM operators WHERE rfid_card_no = ?1";

/// An RFID card and the person it belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Operator {
    pub id: i64,
    pub rfid_card_no: String,
    pub operator_name: String,
    pub remarks: Option<String>,
}

/// One row of an operator CSV: `rfid_card_no,operator_name[,remarks]`.
#[derive(Deserialize, Debug)]
struct OperatorRow {
    rfid_card_no: String,
    operator_name: String,
    #[serde(default)]
    remarks: Option<String>,
}

#[derive(Clone)]
pub struct Operators {
    conn: SharedConnection,
}

impl Operators {
    pub fn new() -> Result<Self> {
        Ok(Self::with_connection(Db::new()?.into_shared()))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_connection(Db::open(path)?.into_shared()))
    }

    pub fn with_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, rfid_card_no: &str, operator_name: &str, remarks: Option<&str>) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(INSERT_OPERATOR, params![rfid_card_no.trim(), operator_name.trim(), remarks])?;
        Ok(conn.last_insert_rowid())
    }

    /// Inserts unless the card is already registered. Returns whether a row was added.
    pub fn insert_if_absent(&self, rfid_card_no: &str, operator_name: &str, remarks: Option<&str>) -> Result<bool> {
        let inserted = self.conn.lock().execute(
            INSERT_OPERATOR_IF_ABSENT,
            params![rfid_card_no.trim(), operator_name.trim(), remarks],
        )?;
        Ok(inserted > 0)
    }

    pub fn fetch_all(&self) -> Result<Vec<Operator>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(SELECT_ALL)?;
        let operators = stmt.query_map([], map_operator)?.collect::<Result<Vec<_>, _>>()?;
        Ok(operators)
    }

    pub fn find_by_name(&self, operator_name: &str) -> Result<Option<Operator>> {
        let operator = self
            .conn
            .lock()
            .query_row(SELECT_BY_NAME, params![operator_name.trim()], map_operator)
            .optional()?;
        Ok(operator)
    }

    pub fn find_by_rfid(&self, rfid_card_no: &str) -> Result<Option<Operator>> {
        let operator = self
            .conn
            .lock()
            .query_row(SELECT_BY_RFID, params![rfid_card_no.trim()], map_operator)
            .optional()?;
        Ok(operator)
    }

    /// Registers every card in the CSV that is not known yet.
    /// Returns `(added, skipped)`.
    pub fn import_csv(&self, path: &Path) -> Result<(usize, usize)> {
        if !path.exists() {
            msg_bail_anyhow!(Message::FileNotFound(path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).flexible(true).from_path(path)?;
        let mut added = 0;
        let mut skipped = 0;
        for row in reader.deserialize::<OperatorRow>() {
            let row = row?;
            let remarks = row.remarks.as_deref().filter(|r| !r.is_empty());
            if self.insert_if_absent(&row.rfid_card_no, &row.operator_name, remarks)? {
                added += 1;
            } else {
                skipped += 1;
            }
        }

        Ok((added, skipped))
    }

    /// Card number to operator name, for labelling report groups.
    pub fn name_map(&self) -> Result<HashMap<String, String>> {
        Ok(self
            .fetch_all()?
            .into_iter()
            .map(|operator| (operator.rfid_card_no, operator.operator_name))
            .collect())
    }
}

fn map_operator(row: &Row<'_>) -> rusqlite::Result<Operator> {
    Ok(Operator {
        id: row.get(0)?,
        rfid_card_no: row.get(1)?,
        operator_name: row.get(2)?,
        remarks: row.get(3)?,
    })
}
