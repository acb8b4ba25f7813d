//! Field domain model.
//!
//! # Responsibility
//! - Define the schema of one configurable form input.
//! - Provide draft/patch shapes used by the store mutation API.
//! - Evaluate validation rules and visibility conditions for entered values.
//!
//! # Invariants
//! - `id` is generated once and never changes for the field lifetime.
//! - `options` is only meaningful for `select`, `checkbox` and `radio`.
//! - A conditional rule must not reference its own field.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one field within a form.
pub type FieldId = Uuid;

const DEFAULT_CHOICE_OPTIONS: [&str; 3] = ["Option 1", "Option 2", "Option 3"];

/// Closed set of supported input primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Email,
    Phone,
    Password,
    Date,
    Select,
    Checkbox,
    Radio,
    Number,
    Textarea,
}

impl FieldType {
    /// All field types in palette order.
    pub const ALL: [FieldType; 10] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Password,
        FieldType::Date,
        FieldType::Select,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Number,
        FieldType::Textarea,
    ];

    /// Returns whether this type carries a list of choice options.
    pub fn has_options(self) -> bool {
        matches!(self, Self::Select | Self::Checkbox | Self::Radio)
    }

    /// Wire name used in JSON payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Password => "password",
            Self::Date => "date",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Number => "number",
            Self::Textarea => "textarea",
        }
    }

    /// Label given to a freshly dropped palette field.
    pub fn default_label(self) -> &'static str {
        match self {
            Self::Text => "Text Input",
            Self::Email => "Email Address",
            Self::Phone => "Phone Number",
            Self::Password => "Password",
            Self::Date => "Date",
            Self::Select => "Select Option",
            Self::Checkbox => "Checkbox Options",
            Self::Radio => "Radio Options",
            Self::Number => "Number",
            Self::Textarea => "Message",
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Constraints applied to entered values.
///
/// Only the subset relevant to the owning field type is enforced; the rest is
/// tolerated and kept for lossless round-trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ValidationRules {
    /// Returns whether no rule is set.
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.min.is_none()
            && self.max.is_none()
    }

    /// Checks one non-empty entered value against the rules relevant to `kind`.
    ///
    /// A pattern that does not compile is not enforced here; structural
    /// problems are reported by [`Field::validate`].
    pub fn check(&self, kind: FieldType, value: &str) -> Result<(), ValueViolation> {
        if kind == FieldType::Number {
            let parsed = value
                .trim()
                .parse::<f64>()
                .map_err(|_| ValueViolation::NotANumber)?;
            if let Some(min) = self.min {
                if parsed < min {
                    return Err(ValueViolation::BelowMin(min));
                }
            }
            if let Some(max) = self.max {
                if parsed > max {
                    return Err(ValueViolation::AboveMax(max));
                }
            }
            return Ok(());
        }

        let length = value.chars().count();
        if let Some(min_length) = self.min_length {
            if length < min_length as usize {
                return Err(ValueViolation::TooShort(min_length));
            }
        }
        if let Some(max_length) = self.max_length {
            if length > max_length as usize {
                return Err(ValueViolation::TooLong(max_length));
            }
        }
        if let Some(pattern) = self.pattern.as_deref() {
            if let Ok(regex) = Regex::new(pattern) {
                if !regex.is_match(value) {
                    return Err(ValueViolation::PatternMismatch(pattern.to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Comparison used by a visibility rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
}

/// Target and comparison of a visibility rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowWhen {
    /// Id of the field whose entered value drives visibility.
    ///
    /// Kept as written by the editor: it may be empty or point at a field
    /// that no longer exists. See [`ShowWhen::target`].
    pub field_id: String,
    pub condition: ConditionOperator,
    pub value: String,
}

impl ShowWhen {
    /// Referenced field id, or `None` when the reference is not a field id.
    pub fn target(&self) -> Option<FieldId> {
        Uuid::parse_str(self.field_id.trim()).ok()
    }
}

/// Visibility rule attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalLogic {
    pub show_when: ShowWhen,
}

impl ConditionalLogic {
    /// Builds a rule showing the owner when `field_id` compares to `value`.
    pub fn show_when(
        field_id: FieldId,
        condition: ConditionOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            show_when: ShowWhen {
                field_id: field_id.to_string(),
                condition,
                value: value.into(),
            },
        }
    }

    /// Evaluates the rule against the referenced field's entered value.
    ///
    /// A missing value compares as the empty string.
    pub fn is_satisfied(&self, actual: Option<&str>) -> bool {
        let actual = actual.unwrap_or_default();
        let expected = self.show_when.value.as_str();
        match self.show_when.condition {
            ConditionOperator::Equals => actual == expected,
            ConditionOperator::NotEquals => actual != expected,
            ConditionOperator::Contains => actual.contains(expected),
        }
    }
}

/// One entry in a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Meaningful only when `kind.has_options()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalLogic>,
}

impl Field {
    /// Creates a field from a draft with a generated stable ID.
    pub fn from_draft(draft: FieldDraft) -> Self {
        Self::with_id(Uuid::new_v4(), draft)
    }

    /// Creates a field from a draft with a caller-provided ID.
    ///
    /// Used by import/template paths where identity already exists.
    pub fn with_id(id: FieldId, draft: FieldDraft) -> Self {
        Self {
            id,
            kind: draft.kind,
            label: draft.label,
            placeholder: draft.placeholder,
            required: draft.required,
            default_value: draft.default_value,
            options: draft.options,
            validation: draft.validation,
            conditional: draft.conditional,
        }
    }

    /// Returns options only when the field type uses them.
    pub fn effective_options(&self) -> Option<&[String]> {
        if self.kind.has_options() {
            self.options.as_deref()
        } else {
            None
        }
    }

    /// Validates structural invariants of this field.
    ///
    /// # Errors
    /// - `NilId` when `id` is the nil UUID.
    /// - `InvalidPattern` when the validation pattern does not compile.
    /// - `InvalidLengthBounds` / `InvalidNumericBounds` for reversed ranges.
    /// - `SelfReferencingCondition` when the rule targets this field.
    pub fn validate(&self) -> Result<(), FieldValidationError> {
        if self.id.is_nil() {
            return Err(FieldValidationError::NilId);
        }

        if let Some(rules) = &self.validation {
            if let Some(pattern) = rules.pattern.as_deref() {
                Regex::new(pattern).map_err(|err| FieldValidationError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: err.to_string(),
                })?;
            }
            if let (Some(min), Some(max)) = (rules.min_length, rules.max_length) {
                if min > max {
                    return Err(FieldValidationError::InvalidLengthBounds { min, max });
                }
            }
            if let (Some(min), Some(max)) = (rules.min, rules.max) {
                if min > max {
                    return Err(FieldValidationError::InvalidNumericBounds { min, max });
                }
            }
        }

        if let Some(conditional) = &self.conditional {
            if conditional.show_when.target() == Some(self.id) {
                return Err(FieldValidationError::SelfReferencingCondition(self.id));
            }
        }

        Ok(())
    }

    /// Checks an entered value against `required` and the validation rules.
    pub fn check_value(&self, value: &str) -> Result<(), ValueViolation> {
        if value.trim().is_empty() {
            return if self.required {
                Err(ValueViolation::Required)
            } else {
                Ok(())
            };
        }

        match &self.validation {
            Some(rules) => rules.check(self.kind, value),
            None => Ok(()),
        }
    }
}

/// A field before it has been given an identity (input of `add_field`).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDraft {
    pub kind: FieldType,
    pub label: String,
    pub placeholder: Option<String>,
    pub required: bool,
    pub default_value: Option<String>,
    pub options: Option<Vec<String>>,
    pub validation: Option<ValidationRules>,
    pub conditional: Option<ConditionalLogic>,
}

impl FieldDraft {
    /// Creates an optional, otherwise empty draft.
    pub fn new(kind: FieldType, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            placeholder: None,
            required: false,
            default_value: None,
            options: None,
            validation: None,
            conditional: None,
        }
    }

    /// Draft used for a field dropped from the palette.
    ///
    /// Choice types receive three placeholder options.
    pub fn palette_default(kind: FieldType) -> Self {
        let label = kind.default_label();
        let mut draft = Self::new(kind, label)
            .placeholder(format!("Enter {}", label.to_lowercase()));
        if kind.has_options() {
            draft.options = Some(
                DEFAULT_CHOICE_OPTIONS
                    .iter()
                    .map(|option| option.to_string())
                    .collect(),
            );
        }
        draft
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn validation(mut self, rules: ValidationRules) -> Self {
        self.validation = Some(rules);
        self
    }

    pub fn conditional(mut self, conditional: ConditionalLogic) -> Self {
        self.conditional = Some(conditional);
        self
    }
}

/// Partial field update.
///
/// `None` leaves the attribute untouched. For optional attributes,
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub kind: Option<FieldType>,
    pub label: Option<String>,
    pub placeholder: Option<Option<String>>,
    pub required: Option<bool>,
    pub default_value: Option<Option<String>>,
    pub options: Option<Option<Vec<String>>>,
    pub validation: Option<Option<ValidationRules>>,
    pub conditional: Option<Option<ConditionalLogic>>,
}

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: FieldType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: Option<String>) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn default_value(mut self, value: Option<String>) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn options(mut self, options: Option<Vec<String>>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn validation(mut self, rules: Option<ValidationRules>) -> Self {
        self.validation = Some(rules);
        self
    }

    pub fn conditional(mut self, conditional: Option<ConditionalLogic>) -> Self {
        self.conditional = Some(conditional);
        self
    }

    /// Returns whether applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges the set attributes into `field`. The field id is never touched.
    pub fn apply_to(&self, field: &mut Field) {
        if let Some(kind) = self.kind {
            field.kind = kind;
        }
        if let Some(label) = &self.label {
            field.label = label.clone();
        }
        if let Some(placeholder) = &self.placeholder {
            field.placeholder = placeholder.clone();
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(default_value) = &self.default_value {
            field.default_value = default_value.clone();
        }
        if let Some(options) = &self.options {
            field.options = options.clone();
        }
        if let Some(validation) = &self.validation {
            field.validation = validation.clone();
        }
        if let Some(conditional) = &self.conditional {
            field.conditional = conditional.clone();
        }
    }
}

/// Structural field errors.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValidationError {
    /// `id` must not be nil.
    NilId,
    /// Validation pattern is not a valid regular expression.
    InvalidPattern { pattern: String, message: String },
    /// `minLength` is greater than `maxLength`.
    InvalidLengthBounds { min: u32, max: u32 },
    /// `min` is greater than `max`.
    InvalidNumericBounds { min: f64, max: f64 },
    /// Conditional rule points at the field that owns it.
    SelfReferencingCondition(FieldId),
}

impl Display for FieldValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "field id must not be nil"),
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid validation pattern `{pattern}`: {message}")
            }
            Self::InvalidLengthBounds { min, max } => {
                write!(f, "minLength ({min}) must be <= maxLength ({max})")
            }
            Self::InvalidNumericBounds { min, max } => {
                write!(f, "min ({min}) must be <= max ({max})")
            }
            Self::SelfReferencingCondition(id) => {
                write!(f, "field {id} has a visibility rule referencing itself")
            }
        }
    }
}

impl Error for FieldValidationError {}

/// Reason an entered value does not satisfy a field.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueViolation {
    Required,
    TooShort(u32),
    TooLong(u32),
    PatternMismatch(String),
    NotANumber,
    BelowMin(f64),
    AboveMax(f64),
}

impl Display for ValueViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => write!(f, "value is required"),
            Self::TooShort(min) => write!(f, "value must be at least {min} characters"),
            Self::TooLong(max) => write!(f, "value must be at most {max} characters"),
            Self::PatternMismatch(pattern) => write!(f, "value does not match `{pattern}`"),
            Self::NotANumber => write!(f, "value is not a number"),
            Self::BelowMin(min) => write!(f, "value must be >= {min}"),
            Self::AboveMax(max) => write!(f, "value must be <= {max}"),
        }
    }
}

impl Error for ValueViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_default_adds_options_only_for_choice_types() {
        let select = FieldDraft::palette_default(FieldType::Select);
        assert_eq!(select.label, "Select Option");
        assert_eq!(select.placeholder.as_deref(), Some("Enter select option"));
        assert_eq!(select.options.as_ref().map(Vec::len), Some(3));

        let email = FieldDraft::palette_default(FieldType::Email);
        assert_eq!(email.placeholder.as_deref(), Some("Enter email address"));
        assert!(email.options.is_none());
        assert!(!email.required);
    }

    #[test]
    fn patch_clears_optional_attributes() {
        let other = Uuid::new_v4();
        let mut field = Field::from_draft(
            FieldDraft::new(FieldType::Text, "Name")
                .placeholder("Your name")
                .conditional(ConditionalLogic::show_when(
                    other,
                    ConditionOperator::Equals,
                    "yes",
                )),
        );
        let id = field.id;

        FieldPatch::new()
            .label("Full name")
            .conditional(None)
            .apply_to(&mut field);

        assert_eq!(field.id, id);
        assert_eq!(field.label, "Full name");
        assert_eq!(field.placeholder.as_deref(), Some("Your name"));
        assert!(field.conditional.is_none());
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(FieldPatch::new().is_empty());
        assert!(!FieldPatch::new().required(true).is_empty());
    }

    #[test]
    fn effective_options_hidden_for_non_choice_types() {
        let mut field = Field::from_draft(
            FieldDraft::new(FieldType::Text, "Name").options(["a", "b"]),
        );
        assert!(field.effective_options().is_none());

        field.kind = FieldType::Radio;
        assert_eq!(field.effective_options().map(<[String]>::len), Some(2));
    }

    #[test]
    fn unresolved_condition_reference_is_kept_verbatim() {
        let json = r#"{"showWhen": {"fieldId": "", "condition": "equals", "value": "x"}}"#;
        let rule: ConditionalLogic = serde_json::from_str(json).unwrap();
        assert_eq!(rule.show_when.field_id, "");
        assert!(rule.show_when.target().is_none());

        let target = Uuid::new_v4();
        let rule = ConditionalLogic::show_when(target, ConditionOperator::Equals, "x");
        assert_eq!(rule.show_when.target(), Some(target));
    }

    #[test]
    fn contains_condition_matches_substring() {
        let rule = ConditionalLogic::show_when(Uuid::new_v4(), ConditionOperator::Contains, "rust");
        assert!(rule.is_satisfied(Some("trusty rustacean")));
        assert!(!rule.is_satisfied(None));
    }
}
