/***************************************/
/*        3rd party libraries          */
/***************************************/
use chrono::Local;
use log::{debug, info};
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{LogRecord, StoreError};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS Logs (
        Id INTEGER PRIMARY KEY AUTOINCREMENT,
        Floor INTEGER NOT NULL,
        Status TEXT NOT NULL,
        Timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
    )";

/**
 * Append-only store of elevator operation records, backed by a single SQLite connection.
 *
 * All access goes through one mutex, so an insert or a clear is never observed half done by a
 * concurrent `fetch_all`. `Id` comes from `AUTOINCREMENT`, which keeps it strictly increasing in
 * write order and never reuses an id, even after `clear_all`.
 */
pub struct LogStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

/// The write side of the store, which is all the logging bridge needs.
pub trait LogWriter: Send + Sync {
    fn insert(&self, floor: i64, status: &str) -> Result<i64, StoreError>;
}

impl LogStore {
    /// Opens (creating if needed) the database file and its parent directory.
    pub fn open(path: &Path) -> Result<LogStore, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                debug!("Created database directory {}", parent.display());
            }
        }

        let conn = Connection::open(path).map_err(|source| StoreError::Init {
            path: path.to_path_buf(),
            source,
        })?;
        let store = LogStore::from_connection(conn, Some(path.to_path_buf()))?;
        info!("Log store ready at {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<LogStore, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Init {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        LogStore::from_connection(conn, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<LogStore, StoreError> {
        conn.execute(CREATE_TABLE, [])
            .map_err(|source| StoreError::Init {
                path: path.clone().unwrap_or_else(|| PathBuf::from(":memory:")),
                source,
            })?;

        Ok(LogStore {
            conn: Mutex::new(conn),
            path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn insert(&self, floor: i64, status: &str) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        let timestamp = Local::now().naive_local();

        conn.execute(
            "INSERT INTO Logs (Floor, Status, Timestamp) VALUES (?1, ?2, ?3)",
            params![floor, status, timestamp],
        )
        .map_err(StoreError::Write)?;

        let id = conn.last_insert_rowid();
        debug!("Log {} inserted: {} at floor {}", id, status, floor);
        Ok(id)
    }

    /// Newest first, by write order. Timestamps are wall-clock and may go backwards.
    pub fn fetch_all(&self) -> Result<Vec<LogRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT Id, Floor, Status, Timestamp FROM Logs ORDER BY Id DESC",
            )
            .map_err(StoreError::Read)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(LogRecord {
                    id: row.get(0)?,
                    floor: row.get(1)?,
                    status: row.get(2)?,
                    timestamp: row.get(3)?,
                })
            })
            .map_err(StoreError::Read)?;

        let records = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::Read)?;
        Ok(records)
    }

    /// Removes every record in one transaction. Returns how many were removed.
    pub fn clear_all(&self) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(StoreError::Write)?;
        let removed = tx
            .execute("DELETE FROM Logs", [])
            .map_err(StoreError::Write)?;
        tx.commit().map_err(StoreError::Write)?;

        info!("Cleared {} log records", removed);
        Ok(removed)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl LogWriter for LogStore {
    fn insert(&self, floor: i64, status: &str) -> Result<i64, StoreError> {
        LogStore::insert(self, floor, status)
    }
}
