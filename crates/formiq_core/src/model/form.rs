//! Form (document) domain model.
//!
//! # Responsibility
//! - Hold form metadata and the ordered field list.
//! - Provide lookup helpers used by the store and import paths.
//!
//! # Invariants
//! - Field ids are unique within one form.
//! - Field order is the canonical rendering and tab order.
//! - `updated_at` is bumped by every mutating store operation.

use crate::model::field::{Field, FieldId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Stable identifier of one form document.
pub type FormId = Uuid;

/// Title given to a freshly created form.
pub const DEFAULT_FORM_TITLE: &str = "Untitled Form";

/// Aggregate root: form metadata plus ordered fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: FormId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<Field>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    /// Creates a default empty form stamped with the current time.
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    /// Creates a default empty form stamped with `now`.
    pub fn new_at(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: DEFAULT_FORM_TITLE.to_string(),
            description: String::new(),
            fields: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns whether the form is still in its untouched default shape.
    pub fn is_pristine(&self) -> bool {
        self.fields.is_empty() && self.title == DEFAULT_FORM_TITLE
    }

    /// Deep comparison of everything except `updated_at`.
    ///
    /// `updated_at` only records that a mutation call happened, so two
    /// snapshots differing in it alone describe the same form.
    pub fn same_content(&self, other: &Form) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.description == other.description
            && self.created_at == other.created_at
            && self.fields == other.fields
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.id == id)
    }

    /// Current index of the field with `id`.
    pub fn position(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|field| field.id == id)
    }

    /// Field ids in form order.
    pub fn field_ids(&self) -> Vec<FieldId> {
        self.fields.iter().map(|field| field.id).collect()
    }

    /// Returns the first id that appears more than once, if any.
    pub fn find_duplicate_field_id(&self) -> Option<FieldId> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        self.fields
            .iter()
            .map(|field| field.id)
            .find(|id| !seen.insert(*id))
    }

    /// Fields visible for the given entered values, in form order.
    ///
    /// Rules pointing at a field that is not part of this form (or at the
    /// owning field itself) are ignored.
    pub fn visible_fields<'a>(&'a self, values: &HashMap<FieldId, String>) -> Vec<&'a Field> {
        self.fields
            .iter()
            .filter(|field| {
                let Some(rule) = &field.conditional else {
                    return true;
                };
                match rule.show_when.target() {
                    Some(target) if target != field.id && self.field(target).is_some() => {
                        rule.is_satisfied(values.get(&target).map(String::as_str))
                    }
                    _ => true,
                }
            })
            .collect()
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field::{ConditionOperator, ConditionalLogic, FieldDraft, FieldType};

    #[test]
    fn same_content_ignores_updated_at_only() {
        let form = Form::new();
        let mut later = form.clone();
        later.touch(form.updated_at + chrono::Duration::seconds(5));
        assert!(form.same_content(&later));

        later.title = "Changed".to_string();
        assert!(!form.same_content(&later));
    }

    #[test]
    fn pristine_requires_default_title_and_no_fields() {
        let mut form = Form::new();
        assert!(form.is_pristine());

        form.title = "Survey".to_string();
        assert!(!form.is_pristine());
    }

    #[test]
    fn visible_fields_evaluates_rules() {
        let mut form = Form::new();
        let trigger = Field::from_draft(FieldDraft::new(FieldType::Radio, "Subscribe?"));
        let dependent = Field::from_draft(
            FieldDraft::new(FieldType::Email, "Email").conditional(ConditionalLogic::show_when(
                trigger.id,
                ConditionOperator::Equals,
                "yes",
            )),
        );
        let trigger_id = trigger.id;
        form.fields = vec![trigger, dependent];

        let mut values = HashMap::new();
        assert_eq!(form.visible_fields(&values).len(), 1);

        values.insert(trigger_id, "yes".to_string());
        assert_eq!(form.visible_fields(&values).len(), 2);
    }
}
