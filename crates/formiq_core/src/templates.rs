//! Built-in starter forms.
//!
//! Templates are instantiated into brand new forms (new form id, new field
//! ids, fresh timestamps) and then loaded through the regular store path.

use crate::model::field::{Field, FieldDraft, FieldType, ValidationRules};
use crate::model::form::Form;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A named starter form.
#[derive(Debug, Clone, Copy)]
pub struct FormTemplate {
    pub title: &'static str,
    pub description: &'static str,
    build_fields: fn() -> Vec<FieldDraft>,
}

impl FormTemplate {
    /// Field drafts of this template in form order.
    pub fn field_drafts(&self) -> Vec<FieldDraft> {
        (self.build_fields)()
    }

    pub fn field_count(&self) -> usize {
        self.field_drafts().len()
    }

    /// Builds a new form from this template.
    pub fn instantiate(&self, now: DateTime<Utc>) -> Form {
        Form {
            id: Uuid::new_v4(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            fields: self
                .field_drafts()
                .into_iter()
                .map(Field::from_draft)
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }
}

const TEMPLATES: &[FormTemplate] = &[
    FormTemplate {
        title: "Contact Form",
        description: "Collect names, email addresses and messages from visitors.",
        build_fields: contact_fields,
    },
    FormTemplate {
        title: "User Registration",
        description: "Sign-up form with account credentials and profile basics.",
        build_fields: registration_fields,
    },
    FormTemplate {
        title: "Event Registration",
        description: "Register attendees and their session preferences.",
        build_fields: event_fields,
    },
    FormTemplate {
        title: "Customer Feedback",
        description: "Gather satisfaction ratings and improvement ideas.",
        build_fields: feedback_fields,
    },
];

/// All built-in templates.
pub fn templates() -> &'static [FormTemplate] {
    TEMPLATES
}

/// Looks up a template by exact title, case-insensitively.
pub fn find_template(title: &str) -> Option<&'static FormTemplate> {
    let needle = title.trim();
    TEMPLATES
        .iter()
        .find(|template| template.title.eq_ignore_ascii_case(needle))
}

/// Templates whose title or description contains `query` (case-insensitive).
pub fn search_templates(query: &str) -> Vec<&'static FormTemplate> {
    let needle = query.trim().to_lowercase();
    TEMPLATES
        .iter()
        .filter(|template| {
            template.title.to_lowercase().contains(&needle)
                || template.description.to_lowercase().contains(&needle)
        })
        .collect()
}

fn contact_fields() -> Vec<FieldDraft> {
    vec![
        FieldDraft::new(FieldType::Text, "Full Name")
            .placeholder("Enter your full name")
            .required(true),
        FieldDraft::new(FieldType::Email, "Email Address")
            .placeholder("you@example.com")
            .required(true),
        FieldDraft::new(FieldType::Phone, "Phone Number").placeholder("Enter your phone number"),
        FieldDraft::new(FieldType::Textarea, "Message")
            .placeholder("How can we help?")
            .required(true)
            .validation(ValidationRules {
                min_length: Some(10),
                max_length: Some(1000),
                ..ValidationRules::default()
            }),
    ]
}

fn registration_fields() -> Vec<FieldDraft> {
    vec![
        FieldDraft::new(FieldType::Text, "Username")
            .required(true)
            .validation(ValidationRules {
                min_length: Some(3),
                max_length: Some(32),
                pattern: Some("^[A-Za-z0-9_]+$".to_string()),
                ..ValidationRules::default()
            }),
        FieldDraft::new(FieldType::Email, "Email Address").required(true),
        FieldDraft::new(FieldType::Password, "Password")
            .required(true)
            .validation(ValidationRules {
                min_length: Some(8),
                ..ValidationRules::default()
            }),
        FieldDraft::new(FieldType::Date, "Date of Birth"),
        FieldDraft::new(FieldType::Checkbox, "Interests").options([
            "Technology",
            "Design",
            "Business",
        ]),
    ]
}

fn event_fields() -> Vec<FieldDraft> {
    vec![
        FieldDraft::new(FieldType::Text, "Attendee Name").required(true),
        FieldDraft::new(FieldType::Email, "Email Address").required(true),
        FieldDraft::new(FieldType::Select, "Ticket Type")
            .required(true)
            .options(["General", "VIP", "Student"]),
        FieldDraft::new(FieldType::Number, "Number of Guests").validation(ValidationRules {
            min: Some(0.0),
            max: Some(5.0),
            ..ValidationRules::default()
        }),
        FieldDraft::new(FieldType::Textarea, "Dietary Requirements"),
    ]
}

fn feedback_fields() -> Vec<FieldDraft> {
    vec![
        FieldDraft::new(FieldType::Radio, "Overall Satisfaction")
            .required(true)
            .options(["Very satisfied", "Satisfied", "Neutral", "Dissatisfied"]),
        FieldDraft::new(FieldType::Select, "How did you hear about us?").options([
            "Search engine",
            "Social media",
            "Friend",
            "Other",
        ]),
        FieldDraft::new(FieldType::Textarea, "What could we improve?"),
        FieldDraft::new(FieldType::Email, "Email (optional)"),
    ]
}

#[cfg(test)]
mod tests {
    use super::{find_template, search_templates, templates};
    use chrono::Utc;

    #[test]
    fn every_template_instantiates_valid_fields() {
        for template in templates() {
            let form = template.instantiate(Utc::now());
            assert_eq!(form.title, template.title);
            assert!(!form.fields.is_empty());
            assert!(form.find_duplicate_field_id().is_none());
            for field in &form.fields {
                field.validate().unwrap();
            }
        }
    }

    #[test]
    fn instances_get_fresh_ids() {
        let template = find_template("contact form").unwrap();
        let first = template.instantiate(Utc::now());
        let second = template.instantiate(Utc::now());
        assert_ne!(first.id, second.id);
        assert_ne!(first.fields[0].id, second.fields[0].id);
    }

    #[test]
    fn search_matches_title_and_description() {
        assert_eq!(search_templates("REGISTRATION").len(), 2);
        assert_eq!(search_templates("satisfaction").len(), 1);
        assert!(search_templates("payroll").is_empty());
    }
}
