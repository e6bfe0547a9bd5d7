//! SQLite-backed command registry.
//!
//! Every public operation is a single SQL statement, so each call is atomic
//! on its own. No transaction spans more than one call.

use crate::{
    CoreError, CoreResult,
    registry::{CommandEntry, EntryId, ResolvedCommand, RunMode},
};

use std::{
    panic::Location,
    path::Path,
    sync::{Mutex, MutexGuard},
};

use error_location::ErrorLocation;
use rusqlite::{Connection, params};
use tracing::{debug, error, info, instrument};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS actions (
    id INTEGER PRIMARY KEY,
    prefix TEXT NOT NULL,
    value TEXT NOT NULL,
    command TEXT NOT NULL
)";

const RUN_MODE_COLUMN: &str = "open_window";

/// Persisted table of command entries.
pub struct Registry {
    conn: Mutex<Connection>,
}

impl Registry {
    /// Open (or create) the store at `path` and migrate its schema.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreUnavailable`] if the file cannot be opened
    /// or the schema cannot be brought up to date.
    #[track_caller]
    #[instrument]
    pub fn open(path: &Path) -> CoreResult<Self> {
        let unavailable = |source: rusqlite::Error| CoreError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                error!(dir = ?parent, error = %e, "Failed to create registry directory");
                unavailable(rusqlite::Error::InvalidPath(parent.to_path_buf()))
            })?;
            debug!(dir = ?parent, "Created registry directory");
        }

        let conn = Connection::open(path).map_err(unavailable)?;
        Self::migrate(&conn).map_err(unavailable)?;

        info!(path = ?path, "Command registry opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory store, used by tests and dry runs.
    #[track_caller]
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, migrating its schema first.
    #[track_caller]
    pub fn from_connection(conn: Connection) -> CoreResult<Self> {
        Self::migrate(&conn).map_err(|source| CoreError::StoreUnavailable {
            path: conn.path().map(Into::into).unwrap_or_default(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Bring the schema up to date. Safe to run on every open.
    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(CREATE_TABLE, [])?;

        let mut stmt = conn.prepare("PRAGMA table_info(actions)")?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if !columns.iter().any(|c| c == RUN_MODE_COLUMN) {
            conn.execute(
                "ALTER TABLE actions ADD COLUMN open_window INTEGER NOT NULL DEFAULT 1",
                [],
            )?;
            info!("Registry migrated: added run mode column");
        }

        Ok(())
    }

    /// Insert a new entry and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when `prefix` or `command` is empty;
    /// nothing is stored in that case.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn add(
        &self,
        prefix: &str,
        value: &str,
        command: &str,
        run_mode: RunMode,
    ) -> CoreResult<EntryId> {
        if prefix.is_empty() {
            return Err(CoreError::Validation {
                field: "prefix",
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if command.is_empty() {
            return Err(CoreError::Validation {
                field: "command",
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let conn = self.connection();
        conn.execute(
            "INSERT INTO actions (prefix, value, command, open_window) VALUES (?1, ?2, ?3, ?4)",
            params![prefix, value, command, run_mode.as_flag()],
        )?;
        let id = conn.last_insert_rowid();

        info!(id, prefix, value, %run_mode, "Command added");

        Ok(id)
    }

    /// Remove every row equal to the full tuple. Returns the number removed.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn delete(
        &self,
        prefix: &str,
        value: &str,
        command: &str,
        run_mode: RunMode,
    ) -> CoreResult<usize> {
        let removed = self.connection().execute(
            "DELETE FROM actions WHERE prefix = ?1 AND value = ?2 AND command = ?3 AND open_window = ?4",
            params![prefix, value, command, run_mode.as_flag()],
        )?;

        info!(prefix, value, removed, "Commands deleted");

        Ok(removed)
    }

    /// Commands registered for exactly `(prefix, value)`, in insertion order.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn lookup(&self, prefix: &str, value: &str) -> CoreResult<Vec<ResolvedCommand>> {
        let conn = self.connection();
        let mut stmt = conn.prepare_cached(
            "SELECT command, open_window FROM actions WHERE prefix = ?1 AND value = ?2 ORDER BY id",
        )?;

        let matches = stmt
            .query_map(params![prefix, value], |row| {
                Ok(ResolvedCommand {
                    command: row.get(0)?,
                    run_mode: RunMode::from_flag(row.get(1)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(matches = matches.len(), "Registry lookup");

        Ok(matches)
    }

    /// Every entry, in insertion order.
    #[track_caller]
    pub fn all(&self) -> CoreResult<Vec<CommandEntry>> {
        let conn = self.connection();
        let mut stmt = conn.prepare_cached(
            "SELECT id, prefix, value, command, open_window FROM actions ORDER BY id",
        )?;

        let entries = stmt
            .query_map([], Self::entry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }

    /// A single entry by id, if it still exists.
    #[track_caller]
    pub fn get(&self, id: EntryId) -> CoreResult<Option<CommandEntry>> {
        let conn = self.connection();
        let mut stmt = conn.prepare_cached(
            "SELECT id, prefix, value, command, open_window FROM actions WHERE id = ?1",
        )?;

        let mut rows = stmt.query_map(params![id], Self::entry_from_row)?;
        Ok(rows.next().transpose()?)
    }

    fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommandEntry> {
        Ok(CommandEntry {
            id: row.get(0)?,
            prefix: row.get(1)?,
            value: row.get(2)?,
            command: row.get(3)?,
            run_mode: RunMode::from_flag(row.get(4)?),
        })
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock still holds a usable connection; every statement
        // is atomic, so no half-applied state can be observed.
        self.conn.lock().unwrap_or_else(|e| {
            error!("Registry lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}
