//! Periodic autosave and restore-at-startup policy.
//!
//! # Responsibility
//! - Define the persisted autosave record and the storage contract.
//! - Decide when to write (interval elapsed, form not pristine).
//! - Decide whether a stored record may be offered for restore.
//!
//! # Invariants
//! - Only one record is kept; every save replaces it.
//! - Pristine forms (no fields, default title) are never written.
//! - A record is restorable only within the restore window and with at least
//!   one field.
//! - Autosave reads a cloned snapshot and never mutates the edited form.

mod sqlite;

pub use sqlite::SqliteAutosaveStorage;

use crate::clock::Clock;
use crate::db::DbError;
use crate::model::form::Form;
use crate::store::FormStore;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage slot key of the single autosave record.
pub const AUTOSAVE_SLOT: &str = "formiq-autosave";
/// Default autosave period.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: i64 = 30;
/// Default maximum age of a restorable record.
pub const DEFAULT_RESTORE_WINDOW_HOURS: i64 = 24;

pub type AutosaveResult<T> = Result<T, AutosaveError>;

/// Autosave persistence failures.
#[derive(Debug)]
pub enum AutosaveError {
    Db(DbError),
    /// Record could not be encoded or the stored payload is corrupt.
    Serialization(serde_json::Error),
}

impl Display for AutosaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid autosave payload: {err}"),
        }
    }
}

impl Error for AutosaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<DbError> for AutosaveError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for AutosaveError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for AutosaveError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Persisted autosave layout: `{ form, timestamp }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutosaveRecord {
    pub form: Form,
    /// ISO-8601 instant of the save.
    pub timestamp: DateTime<Utc>,
}

impl AutosaveRecord {
    /// Returns whether this record may be offered for restore at `now`.
    pub fn is_restorable(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.timestamp < window && !self.form.fields.is_empty()
    }
}

/// Durable single-slot storage for autosave records.
pub trait AutosaveStorage {
    fn load(&self) -> AutosaveResult<Option<AutosaveRecord>>;
    fn save(&self, record: &AutosaveRecord) -> AutosaveResult<()>;
    fn clear(&self) -> AutosaveResult<()>;
}

/// Autosave timing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveConfig {
    pub interval: Duration,
    pub restore_window: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::seconds(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            restore_window: Duration::hours(DEFAULT_RESTORE_WINDOW_HOURS),
        }
    }
}

/// Interval-driven autosaver.
///
/// The caller drives it with [`Autosaver::tick`] from its event loop; the
/// first tick only arms the timer, like an interval that fires after one
/// full period.
pub struct Autosaver<S: AutosaveStorage> {
    storage: S,
    config: AutosaveConfig,
    next_due: Option<DateTime<Utc>>,
}

impl<S: AutosaveStorage> Autosaver<S> {
    pub fn new(storage: S, config: AutosaveConfig) -> Self {
        Self {
            storage,
            config,
            next_due: None,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &AutosaveConfig {
        &self.config
    }

    /// Saves the store's form when the interval has elapsed.
    ///
    /// Returns `Ok(true)` when a record was written.
    pub fn tick<C: Clock>(
        &mut self,
        store: &mut FormStore<C>,
        now: DateTime<Utc>,
    ) -> AutosaveResult<bool> {
        match self.next_due {
            None => {
                self.next_due = Some(now + self.config.interval);
                return Ok(false);
            }
            Some(due) if now < due => return Ok(false),
            Some(_) => self.next_due = Some(now + self.config.interval),
        }
        self.save_now(store, now)
    }

    /// Saves the store's form immediately unless it is pristine.
    pub fn save_now<C: Clock>(
        &self,
        store: &mut FormStore<C>,
        now: DateTime<Utc>,
    ) -> AutosaveResult<bool> {
        if store.form().is_pristine() {
            debug!("event=autosave module=autosave status=skipped reason=pristine");
            return Ok(false);
        }

        let record = AutosaveRecord {
            form: store.form().clone(),
            timestamp: now,
        };
        self.storage.save(&record)?;
        store.mark_saved(now);
        info!(
            "event=autosave module=autosave status=ok form_id={} fields={}",
            record.form.id,
            record.form.fields.len()
        );
        Ok(true)
    }

    /// Returns the stored record when it is eligible for restore at `now`.
    ///
    /// A corrupt payload is logged and treated as absent.
    pub fn restore_candidate(&self, now: DateTime<Utc>) -> AutosaveResult<Option<AutosaveRecord>> {
        let record = match self.storage.load() {
            Ok(record) => record,
            Err(AutosaveError::Serialization(err)) => {
                warn!("event=autosave_restore module=autosave status=error error_code=corrupt_payload error={err}");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        Ok(record.filter(|record| record.is_restorable(now, self.config.restore_window)))
    }

    /// Removes the stored record.
    pub fn clear(&self) -> AutosaveResult<()> {
        self.storage.clear()
    }
}
