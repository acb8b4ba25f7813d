//! JSON import/export for form documents.
//!
//! # Responsibility
//! - Parse and validate imported form JSON without touching store state.
//! - Produce the JSON export envelope read by external generators.
//!
//! # Invariants
//! - Imports never trust the payload's form id or timestamps.
//! - A payload without a `fields` array is rejected before any parsing of
//!   individual fields.
//! - Field ids from the payload are kept so conditional rules stay intact;
//!   a repeated id is re-keyed so ids stay unique within the form.
//! - Only the payload shape is checked. Rule consistency (bounds, patterns,
//!   condition targets) is left to `Field::validate` callers, so anything the
//!   store can build can be imported again.

use crate::model::field::Field;
use crate::model::form::{Form, DEFAULT_FORM_TITLE};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Export envelope version written next to the form.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Import payload failures.
#[derive(Debug)]
pub enum ValidationError {
    /// Payload is not valid JSON.
    MalformedJson(serde_json::Error),
    /// Payload has no `fields` key.
    MissingFields,
    /// `fields` exists but is not an array.
    FieldsNotArray,
    /// Payload shape does not match the form schema.
    InvalidForm(serde_json::Error),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedJson(err) => write!(f, "import payload is not valid JSON: {err}"),
            Self::MissingFields => write!(f, "import payload has no `fields` array"),
            Self::FieldsNotArray => write!(f, "import payload `fields` must be an array"),
            Self::InvalidForm(err) => write!(f, "import payload is not a valid form: {err}"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedJson(err) => Some(err),
            Self::InvalidForm(err) => Some(err),
            Self::MissingFields | Self::FieldsNotArray => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedForm {
    #[serde(default = "default_title")]
    title: String,
    #[serde(default)]
    description: String,
    fields: Vec<Field>,
}

fn default_title() -> String {
    DEFAULT_FORM_TITLE.to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedForm<'a> {
    #[serde(flatten)]
    form: &'a Form,
    exported_at: DateTime<Utc>,
    version: &'static str,
}

/// Parses an imported payload into a fresh form stamped with `now`.
///
/// # Errors
/// - `MalformedJson` for unparsable text.
/// - `MissingFields` / `FieldsNotArray` when `fields` is absent or not a list.
/// - `InvalidForm` when a value has the wrong type (unknown field type,
///   non-UUID field id, non-string label, ...).
pub fn parse_form_import(json: &str, now: DateTime<Utc>) -> Result<Form, ValidationError> {
    let value: Value = serde_json::from_str(json).map_err(ValidationError::MalformedJson)?;
    match value.get("fields") {
        None => return Err(ValidationError::MissingFields),
        Some(fields) if !fields.is_array() => return Err(ValidationError::FieldsNotArray),
        Some(_) => {}
    }

    let imported: ImportedForm =
        serde_json::from_value(value).map_err(ValidationError::InvalidForm)?;

    let mut fields = imported.fields;
    rekey_repeated_ids(&mut fields);

    Ok(Form {
        id: Uuid::new_v4(),
        title: imported.title,
        description: imported.description,
        fields,
        created_at: now,
        updated_at: now,
    })
}

fn rekey_repeated_ids(fields: &mut [Field]) {
    let mut seen = HashSet::with_capacity(fields.len());
    for (index, field) in fields.iter_mut().enumerate() {
        if !seen.insert(field.id) {
            let replacement = Uuid::new_v4();
            warn!(
                "event=form_import module=store status=rekeyed index={index} field_id={} new_id={replacement}",
                field.id
            );
            field.id = replacement;
            seen.insert(replacement);
        }
    }
}

/// Serializes `form` into the pretty-printed export envelope.
///
/// The envelope is the form object plus `exportedAt` and `version` keys, so
/// it can be fed straight back into [`parse_form_import`].
pub fn export_form_json(form: &Form, now: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExportedForm {
        form,
        exported_at: now,
        version: EXPORT_FORMAT_VERSION,
    })
}

#[cfg(test)]
mod tests {
    use super::{export_form_json, parse_form_import, ValidationError};
    use crate::model::form::DEFAULT_FORM_TITLE;
    use chrono::Utc;

    #[test]
    fn rejects_non_array_fields() {
        let err = parse_form_import(r#"{"fields": {"a": 1}}"#, Utc::now()).unwrap_err();
        assert!(matches!(err, ValidationError::FieldsNotArray));
    }

    #[test]
    fn rejects_top_level_array() {
        let err = parse_form_import("[]", Utc::now()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingFields));
    }

    #[test]
    fn missing_title_falls_back_to_default() {
        let form = parse_form_import(r#"{"fields": []}"#, Utc::now()).unwrap();
        assert_eq!(form.title, DEFAULT_FORM_TITLE);
        assert!(form.description.is_empty());
    }

    #[test]
    fn repeated_field_ids_are_rekeyed() {
        let json = r#"{
            "fields": [
                {"id": "11111111-2222-4333-8444-555555555555", "type": "text", "label": "A", "required": false},
                {"id": "11111111-2222-4333-8444-555555555555", "type": "email", "label": "B", "required": true}
            ]
        }"#;
        let form = parse_form_import(json, Utc::now()).unwrap();
        assert_eq!(form.fields.len(), 2);
        assert_eq!(
            form.fields[0].id.to_string(),
            "11111111-2222-4333-8444-555555555555"
        );
        assert_ne!(form.fields[1].id, form.fields[0].id);
        assert!(form.find_duplicate_field_id().is_none());
    }

    #[test]
    fn uncompilable_pattern_is_imported_as_written() {
        let json = r#"{
            "fields": [
                {"id": "11111111-2222-4333-8444-555555555555", "type": "text", "label": "A",
                 "required": false, "validation": {"pattern": "(unclosed"}}
            ]
        }"#;
        let form = parse_form_import(json, Utc::now()).unwrap();
        let rules = form.fields[0].validation.as_ref().unwrap();
        assert_eq!(rules.pattern.as_deref(), Some("(unclosed"));
        assert!(form.fields[0].validate().is_err());
    }

    #[test]
    fn export_contains_envelope_keys() {
        let form = crate::model::form::Form::new();
        let json = export_form_json(&form, Utc::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1.0");
        assert!(value["exportedAt"].is_string());
        assert_eq!(value["title"], DEFAULT_FORM_TITLE);
        assert!(value["fields"].is_array());
    }
}
