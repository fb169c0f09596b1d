use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::{Connection, params};

use super::{ReplicationError, StoredFile};

/// Persisted audit trail of mirrored files.
#[derive(Debug)]
pub struct FetchLog {
    connection: Connection,
    location: Utf8PathBuf,
}

impl FetchLog {
    /// Open (or create) the fetch log at `path`.
    ///
    /// # Errors
    /// Returns [`ReplicationError::InitialiseLog`] when the database cannot be
    /// opened or its table created.
    pub fn initialise(path: &Utf8Path) -> Result<Self, ReplicationError> {
        let init_error = |source: rusqlite::Error| ReplicationError::InitialiseLog {
            path: path.to_path_buf(),
            source,
        };
        let connection = Connection::open(path.as_std_path()).map_err(init_error)?;
        connection
            .execute(
                "CREATE TABLE IF NOT EXISTS fetches (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    sequence INTEGER NOT NULL,
                    url TEXT NOT NULL,
                    output_path TEXT NOT NULL,
                    bytes_written INTEGER NOT NULL,
                    fetched_at INTEGER NOT NULL
                )",
                [],
            )
            .map_err(init_error)?;
        Ok(Self {
            connection,
            location: path.to_path_buf(),
        })
    }

    /// Record a stored file.
    ///
    /// # Errors
    /// Returns [`ReplicationError::RecordLog`] when the insert fails and
    /// [`ReplicationError::RecordLogValue`] when a value does not fit SQLite.
    pub fn record(&self, file: &StoredFile) -> Result<(), ReplicationError> {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        let fetched_at = i64::try_from(seconds).map_err(|source| {
            ReplicationError::RecordLogValue {
                what: "timestamp",
                source,
            }
        })?;
        let bytes = i64::try_from(file.bytes).map_err(|source| {
            ReplicationError::RecordLogValue {
                what: "bytes written",
                source,
            }
        })?;
        self.connection
            .execute(
                "INSERT INTO fetches (
                    sequence,
                    url,
                    output_path,
                    bytes_written,
                    fetched_at
                ) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    file.sequence.get(),
                    file.url,
                    file.path.as_str(),
                    bytes,
                    fetched_at
                ],
            )
            .map_err(|source| ReplicationError::RecordLog { source })?;
        Ok(())
    }

    /// Number of recorded fetches.
    ///
    /// # Errors
    /// Returns [`ReplicationError::RecordLog`] when the query fails.
    pub fn count(&self) -> Result<u64, ReplicationError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM fetches", [], |row| row.get(0))
            .map_err(|source| ReplicationError::RecordLog { source })?;
        u64::try_from(count).map_err(|source| ReplicationError::RecordLogValue {
            what: "row count",
            source,
        })
    }

    /// Location of the underlying SQLite database.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.location
    }

    #[cfg(test)]
    pub(crate) const fn connection(&self) -> &Connection {
        &self.connection
    }
}
