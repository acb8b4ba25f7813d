//! Core form-editing engine for FormIQ.
//! This crate is the single source of truth for form document invariants,
//! undo/redo history and autosave policy.

pub mod autosave;
pub mod clock;
pub mod db;
pub mod history;
pub mod logging;
pub mod model;
pub mod reorder;
pub mod store;
pub mod templates;

pub use autosave::{
    AutosaveConfig, AutosaveError, AutosaveRecord, AutosaveResult, AutosaveStorage, Autosaver,
    SqliteAutosaveStorage,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use history::{CommitOutcome, FormHistory, DEFAULT_HISTORY_CAPACITY};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::field::{
    ConditionOperator, ConditionalLogic, Field, FieldDraft, FieldId, FieldPatch, FieldType,
    FieldValidationError, ShowWhen, ValidationRules, ValueViolation,
};
pub use model::form::{Form, FormId, DEFAULT_FORM_TITLE};
pub use store::import::{export_form_json, parse_form_import, ValidationError};
pub use store::{BulkFieldUpdate, DragGesture, FormMetaUpdate, FormStore, StoreConfig};
pub use templates::{find_template, search_templates, templates, FormTemplate};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
