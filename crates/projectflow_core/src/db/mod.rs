//! The board's on-disk home: one SQLite file holding a key-value table.
//!
//! The board snapshot is the only entry the store writes today; the table
//! stays generic so later settings can live beside it without a new file.
//! Connections handed out here are always migrated to [`migrations::latest_version`].

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// File name of the board database inside the application data directory.
pub const DB_FILE_NAME: &str = "projectflow.sqlite3";

pub type DbResult<T> = Result<T, DbError>;

/// Failures opening or migrating the board database.
#[derive(Debug)]
pub enum DbError {
    /// SQLite refused the open, a pragma, or a migration statement.
    Sqlite(rusqlite::Error),
    /// The database was written by a newer build than this one.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "board database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
