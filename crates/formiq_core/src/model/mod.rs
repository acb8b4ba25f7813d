//! Form domain model.
//!
//! # Responsibility
//! - Define the field and form data structures shared by store, history and
//!   import/export paths.
//!
//! # Invariants
//! - Every field and form is identified by a stable UUID.
//! - Model types are plain data; mutation policy lives in `store`.

pub mod field;
pub mod form;
