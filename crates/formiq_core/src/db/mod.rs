//! SQLite file holding the autosave slot.
//!
//! # Responsibility
//! - Open the autosave database and bring its schema up to date.
//!
//! # Invariants
//! - Schema revision lives in `PRAGMA user_version`.
//! - `autosave_records` is never read or written before migrations succeed.
//! - A file stamped by a newer build is refused rather than downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use migrations::{schema_revision, SCHEMA_REVISION};
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Autosave database failures.
#[derive(Debug)]
pub enum DbError {
    /// Driver-level failure while opening, querying or writing.
    Sqlite(rusqlite::Error),
    /// One migration step failed; the whole upgrade was rolled back.
    Migration {
        revision: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file was written by a FormIQ build with a newer autosave schema.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "autosave database error: {err}"),
            Self::Migration {
                revision,
                name,
                source,
            } => write!(
                f,
                "autosave schema migration r{revision} ({name}) failed: {source}"
            ),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "autosave schema r{found} comes from a newer FormIQ build; this build reads up to r{supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn migration_error_names_failing_step() {
        let err = DbError::Migration {
            revision: 1,
            name: "autosave_records",
            source: rusqlite::Error::QueryReturnedNoRows,
        };
        let message = err.to_string();
        assert!(message.contains("r1"));
        assert!(message.contains("autosave_records"));
        assert!(err.source().is_some());
    }
}
