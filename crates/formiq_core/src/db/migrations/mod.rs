//! Autosave schema upgrades.
//!
//! # Invariants
//! - Steps are listed in strictly increasing `revision` order.
//! - All pending steps run in one transaction; `user_version` is bumped
//!   after each step inside it.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    revision: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    revision: 1,
    name: "autosave_records",
    sql: include_str!("0001_autosave.sql"),
}];

/// Autosave schema revision this build writes.
pub const SCHEMA_REVISION: u32 = 1;

/// Reads the schema revision stamped on `conn`.
pub fn schema_revision(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Runs every step newer than the file's current revision.
///
/// # Errors
/// - `SchemaTooNew` when the file is ahead of [`SCHEMA_REVISION`].
/// - `Migration` naming the failing step; nothing is applied in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = schema_revision(conn)?;
    if found > SCHEMA_REVISION {
        return Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_REVISION,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.revision > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.revision))
            .map_err(|source| DbError::Migration {
                revision: step.revision,
                name: step.name,
                source,
            })?;
        info!(
            "event=db_migrate module=db status=ok revision={} name={}",
            step.revision, step.name
        );
    }
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{SCHEMA_REVISION, SCHEMA_STEPS};

    #[test]
    fn steps_are_ordered_and_end_at_current_revision() {
        assert!(SCHEMA_STEPS
            .windows(2)
            .all(|pair| pair[0].revision < pair[1].revision));
        assert_eq!(
            SCHEMA_STEPS.last().map(|step| step.revision),
            Some(SCHEMA_REVISION)
        );
    }
}
