use chrono::Duration;
use formiq_core::{
    ConditionOperator, ConditionalLogic, FieldDraft, FieldPatch, FieldType, FormMetaUpdate,
    FormStore, ManualClock, StoreConfig, ValidationError, ValidationRules,
};

fn setup() -> (FormStore<ManualClock>, ManualClock) {
    let clock = ManualClock::default();
    let store = FormStore::with_clock(StoreConfig::default(), clock.clone());
    (store, clock)
}

#[test]
fn export_then_import_keeps_content_but_not_identity() {
    let (mut source, clock) = setup();
    source.update_form_meta(FormMetaUpdate {
        title: Some("Newsletter".to_string()),
        description: Some("Sign up <b>now</b>".to_string()),
    });
    let opt_in = source.add_field(
        FieldDraft::new(FieldType::Checkbox, "Topics")
            .options(["Rust", "Databases"])
            .required(true),
    );
    source.add_field(
        FieldDraft::new(FieldType::Email, "Email")
            .placeholder("you@example.com")
            .validation(ValidationRules {
                max_length: Some(120),
                pattern: Some(r"^\S+@\S+$".to_string()),
                ..ValidationRules::default()
            })
            .conditional(ConditionalLogic::show_when(
                opt_in,
                ConditionOperator::Contains,
                "Rust",
            )),
    );
    source.add_field(
        FieldDraft::new(FieldType::Number, "Age").validation(ValidationRules {
            min: Some(13.0),
            max: Some(120.5),
            ..ValidationRules::default()
        }),
    );

    let exported = source.export_json().unwrap();
    clock.advance(Duration::minutes(5));

    let mut target = FormStore::with_clock(StoreConfig::default(), clock.clone());
    target.import_form(&exported).unwrap();

    let original = source.form();
    let imported = target.form();
    assert_eq!(imported.fields, original.fields);
    assert_eq!(imported.title, original.title);
    assert_eq!(imported.description, original.description);
    assert_ne!(imported.id, original.id);
    assert_ne!(imported.created_at, original.created_at);
    assert_ne!(imported.updated_at, original.updated_at);
}

#[test]
fn store_built_rules_survive_export_and_import() {
    let (mut source, _) = setup();
    let code = source.add_field(FieldDraft::new(FieldType::Text, "Code"));
    let echo = source.add_field(FieldDraft::new(FieldType::Text, "Echo"));
    source.update_field(
        code,
        FieldPatch::new().validation(Some(ValidationRules {
            min_length: Some(5),
            max_length: Some(2),
            ..ValidationRules::default()
        })),
    );
    source.update_field(
        echo,
        FieldPatch::new().conditional(Some(ConditionalLogic::show_when(
            echo,
            ConditionOperator::Equals,
            "on",
        ))),
    );
    source.flush_pending_commit();

    let mut target = FormStore::with_clock(StoreConfig::default(), ManualClock::default());
    target.import_form(&source.export_json().unwrap()).unwrap();

    assert_eq!(target.form().fields, source.form().fields);
    assert!(target.form().fields[0].validate().is_err());
    assert!(target.form().fields[1].validate().is_err());
}

#[test]
fn import_accepts_unresolved_condition_reference() {
    let (mut store, _) = setup();
    let json = r#"{
        "title": "Draft",
        "fields": [
            {"id": "11111111-2222-4333-8444-555555555555", "type": "text", "label": "A",
             "conditional": {"showWhen": {"fieldId": "", "condition": "equals", "value": ""}}}
        ]
    }"#;
    store.import_form(json).unwrap();

    let field = &store.form().fields[0];
    let rule = field.conditional.as_ref().unwrap();
    assert_eq!(rule.show_when.field_id, "");
    assert!(rule.show_when.target().is_none());
    assert_eq!(store.form().visible_fields(&Default::default()).len(), 1);
}

#[test]
fn import_without_fields_leaves_state_untouched() {
    let (mut store, _) = setup();
    let id = store.add_field(FieldDraft::new(FieldType::Text, "A"));
    store.add_field(FieldDraft::new(FieldType::Text, "B"));
    store.undo();
    store.update_field(id, FieldPatch::new().label("typing"));

    let form_before = store.form().clone();
    let history_before = store.history().clone();
    let pending_before = store.pending_commit_at();

    let err = store.import_form(r#"{"title":"X"}"#).unwrap_err();
    assert!(matches!(err, ValidationError::MissingFields));

    assert_eq!(store.form(), &form_before);
    assert_eq!(store.history().past(), history_before.past());
    assert_eq!(store.history().present(), history_before.present());
    assert_eq!(store.history().future(), history_before.future());
    assert_eq!(store.pending_commit_at(), pending_before);
    assert!(store.can_redo());
}

#[test]
fn import_rejects_malformed_payloads() {
    let (mut store, _) = setup();

    let err = store.import_form("{not json").unwrap_err();
    assert!(matches!(err, ValidationError::MalformedJson(_)));

    let err = store.import_form(r#"{"fields": "nope"}"#).unwrap_err();
    assert!(matches!(err, ValidationError::FieldsNotArray));

    let err = store
        .import_form(r#"{"fields": [{"id": "not-a-uuid", "type": "text", "label": "A"}]}"#)
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidForm(_)));

    let err = store
        .import_form(
            r#"{"fields": [{"id": "11111111-2222-4333-8444-555555555555", "type": "color", "label": "A"}]}"#,
        )
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidForm(_)));
    assert!(store.form().is_pristine());
}

#[test]
fn successful_import_restarts_history_and_clears_selection() {
    let (mut store, _) = setup();
    let id = store.add_field(FieldDraft::new(FieldType::Text, "A"));
    store.add_field(FieldDraft::new(FieldType::Text, "B"));
    store.select_field(Some(id));

    let json = r#"{
        "id": "ignored",
        "title": "Imported",
        "createdAt": "2001-01-01T00:00:00Z",
        "fields": [
            {"id": "11111111-2222-4333-8444-555555555555", "type": "select",
             "label": "Pick", "required": true, "options": ["x", "y"]}
        ]
    }"#;
    let form_id = store.import_form(json).unwrap();

    assert_eq!(store.form().id, form_id);
    assert_eq!(store.form().title, "Imported");
    assert_eq!(store.form().fields.len(), 1);
    assert_ne!(store.form().created_at.to_rfc3339(), "2001-01-01T00:00:00+00:00");
    assert_eq!(store.selected_field_id(), None);
    assert!(!store.can_undo());
    assert!(!store.can_redo());
    assert_eq!(store.history().present(), Some(store.form()));
}

#[test]
fn export_uses_camel_case_wire_names() {
    let (mut store, _) = setup();
    store.add_field(
        FieldDraft::new(FieldType::Text, "Name")
            .default_value("Ada")
            .validation(ValidationRules {
                min_length: Some(2),
                ..ValidationRules::default()
            }),
    );

    let value: serde_json::Value = serde_json::from_str(&store.export_json().unwrap()).unwrap();
    for key in ["id", "title", "description", "fields", "createdAt", "updatedAt"] {
        assert!(value.get(key).is_some(), "missing document key {key}");
    }
    let field = &value["fields"][0];
    assert_eq!(field["type"], "text");
    assert_eq!(field["defaultValue"], "Ada");
    assert_eq!(field["validation"]["minLength"], 2);
    assert_eq!(field["required"], false);
    assert!(field.get("options").is_none());
    assert!(field.get("conditional").is_none());
}
