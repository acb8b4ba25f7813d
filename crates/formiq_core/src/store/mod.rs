//! Form editing store.
//!
//! # Responsibility
//! - Own the single working copy of the edited form.
//! - Apply mutation requests and commit snapshots to the owned history.
//! - Hold transient UI state (selection, dragging flag, last autosave).
//! - Coalesce keystroke-driven edits into one debounced history commit.
//!
//! # Invariants
//! - Operations on unknown field ids are silent no-ops without a commit.
//! - History snapshots are clones; later edits never alter them.
//! - At most one debounced commit is pending; each `update_field` replaces it.
//! - A pending commit is flushed before any other history transition, so a
//!   debounced edit always becomes its own undo step.
//! - Selection and dragging state never reach history.

pub mod import;

use crate::clock::{Clock, SystemClock};
use crate::history::{CommitOutcome, FormHistory, DEFAULT_HISTORY_CAPACITY};
use crate::model::field::{Field, FieldDraft, FieldId, FieldPatch, FieldType};
use crate::model::form::{Form, FormId};
use crate::reorder::{move_item, reorder_by_id};
use crate::templates::find_template;
use chrono::{DateTime, Duration, Utc};
use import::{export_form_json, parse_form_import, ValidationError};
use log::{debug, info, warn};
use std::collections::HashMap;

/// Default quiet period before a debounced edit is committed.
pub const DEFAULT_DEBOUNCE_MS: i64 = 500;

const COPY_SUFFIX: &str = " (Copy)";

/// Store tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of undo steps kept.
    pub history_capacity: usize,
    /// Quiet period after the last `update_field` before it is committed.
    pub debounce: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            debounce: Duration::milliseconds(DEFAULT_DEBOUNCE_MS),
        }
    }
}

/// Same partial update applied to several fields at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkFieldUpdate {
    pub field_ids: Vec<FieldId>,
    pub updates: FieldPatch,
}

/// Form metadata update; `None` members are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormMetaUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Completed drag gesture on the form canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragGesture {
    /// An existing field was dropped onto another one.
    Reposition { source: FieldId, target: FieldId },
    /// A new field type was dropped from the palette.
    Palette(FieldType),
}

/// Mutable editing state for one form.
pub struct FormStore<C: Clock = SystemClock> {
    form: Form,
    selected_field_id: Option<FieldId>,
    is_dragging: bool,
    last_saved: Option<DateTime<Utc>>,
    history: FormHistory,
    pending_commit_at: Option<DateTime<Utc>>,
    config: StoreConfig,
    clock: C,
}

impl FormStore<SystemClock> {
    /// Creates a store with default config and the wall clock.
    pub fn new() -> Self {
        Self::with_clock(StoreConfig::default(), SystemClock)
    }
}

impl Default for FormStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FormStore<C> {
    /// Creates a store holding a default form.
    ///
    /// History starts empty; the first commit becomes its baseline.
    pub fn with_clock(config: StoreConfig, clock: C) -> Self {
        let form = Form::new_at(clock.now());
        let history = FormHistory::with_capacity(config.history_capacity);
        Self {
            form,
            selected_field_id: None,
            is_dragging: false,
            last_saved: None,
            history,
            pending_commit_at: None,
            config,
            clock,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn selected_field_id(&self) -> Option<FieldId> {
        self.selected_field_id
    }

    /// Currently selected field, if it still exists.
    pub fn selected_field(&self) -> Option<&Field> {
        self.selected_field_id.and_then(|id| self.form.field(id))
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &FormHistory {
        &self.history
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns whether a debounced edit is waiting to be committed.
    pub fn has_pending_commit(&self) -> bool {
        self.pending_commit_at.is_some()
    }

    /// Deadline of the pending debounced commit.
    pub fn pending_commit_at(&self) -> Option<DateTime<Utc>> {
        self.pending_commit_at
    }

    /// Appends a new field built from `draft` and commits immediately.
    ///
    /// Selection is left unchanged.
    pub fn add_field(&mut self, draft: FieldDraft) -> FieldId {
        self.flush_pending_commit();
        let field = Field::from_draft(draft);
        let id = field.id;
        self.form.fields.push(field);
        self.touch();
        debug!("event=field_add module=store status=ok field_id={id}");
        self.commit();
        id
    }

    /// Merges `patch` into the field with `id`.
    ///
    /// The working copy changes immediately; the history commit is deferred
    /// until the debounce window passes without another call. Returns `false`
    /// for unknown ids.
    pub fn update_field(&mut self, id: FieldId, patch: FieldPatch) -> bool {
        let Some(field) = self.form.field_mut(id) else {
            debug!("event=field_update module=store status=noop reason=not_found field_id={id}");
            return false;
        };
        patch.apply_to(field);
        let now = self.clock.now();
        self.form.touch(now);
        self.pending_commit_at = Some(now + self.config.debounce);
        debug!("event=field_update module=store status=pending field_id={id}");
        true
    }

    /// Inserts a copy of the field right after the original.
    ///
    /// The copy gets a new id and a ` (Copy)` label suffix.
    pub fn duplicate_field(&mut self, id: FieldId) -> Option<FieldId> {
        let Some(index) = self.form.position(id) else {
            debug!("event=field_duplicate module=store status=noop reason=not_found field_id={id}");
            return None;
        };
        self.flush_pending_commit();

        let mut copy = self.form.fields[index].clone();
        copy.id = uuid::Uuid::new_v4();
        copy.label.push_str(COPY_SUFFIX);
        let copy_id = copy.id;
        self.form.fields.insert(index + 1, copy);
        self.touch();
        debug!("event=field_duplicate module=store status=ok field_id={id} copy_id={copy_id}");
        self.commit();
        Some(copy_id)
    }

    /// Removes the field; clears the selection if it pointed at it.
    pub fn remove_field(&mut self, id: FieldId) -> bool {
        let Some(index) = self.form.position(id) else {
            debug!("event=field_remove module=store status=noop reason=not_found field_id={id}");
            return false;
        };
        self.flush_pending_commit();

        self.form.fields.remove(index);
        if self.selected_field_id == Some(id) {
            self.selected_field_id = None;
        }
        self.touch();
        debug!("event=field_remove module=store status=ok field_id={id}");
        self.commit();
        true
    }

    /// Moves the field at `from` to `to`, keeping every other field in order.
    ///
    /// An out-of-range `from` is rejected; `to` is clamped to the last index.
    pub fn reorder_fields(&mut self, from: usize, to: usize) -> bool {
        if from >= self.form.fields.len() {
            warn!(
                "event=field_reorder module=store status=rejected from={from} to={to} len={}",
                self.form.fields.len()
            );
            return false;
        }
        self.flush_pending_commit();

        move_item(&mut self.form.fields, from, to);
        self.touch();
        debug!("event=field_reorder module=store status=ok from={from} to={to}");
        self.commit();
        true
    }

    /// Drops `source` onto the position currently held by `target`.
    ///
    /// Indices are resolved from the live field list. Returns `false` when the
    /// ids are equal or either field no longer exists.
    pub fn move_field(&mut self, source: FieldId, target: FieldId) -> bool {
        match reorder_by_id(&self.form.field_ids(), &source, &target) {
            Some((from, to)) => self.reorder_fields(from, to),
            None => {
                debug!(
                    "event=field_move module=store status=noop source={source} target={target}"
                );
                false
            }
        }
    }

    /// Applies the same patch to every listed field with one commit.
    ///
    /// Returns the number of fields that matched.
    pub fn bulk_update_fields(&mut self, update: &BulkFieldUpdate) -> usize {
        let matched = self
            .form
            .fields
            .iter()
            .filter(|field| update.field_ids.contains(&field.id))
            .count();
        if matched == 0 {
            debug!("event=field_bulk_update module=store status=noop reason=no_match");
            return 0;
        }
        self.flush_pending_commit();

        for field in self
            .form
            .fields
            .iter_mut()
            .filter(|field| update.field_ids.contains(&field.id))
        {
            update.updates.apply_to(field);
        }
        self.touch();
        debug!("event=field_bulk_update module=store status=ok matched={matched}");
        self.commit();
        matched
    }

    /// Sets per-field default values (sample-data fill, clear-all) in one commit.
    ///
    /// `None` clears a field's default value. Unknown ids are ignored.
    pub fn apply_field_values(&mut self, values: &HashMap<FieldId, Option<String>>) -> usize {
        let matched = self
            .form
            .fields
            .iter()
            .filter(|field| values.contains_key(&field.id))
            .count();
        if matched == 0 {
            return 0;
        }
        self.flush_pending_commit();

        for field in self.form.fields.iter_mut() {
            if let Some(value) = values.get(&field.id) {
                field.default_value = value.clone();
            }
        }
        self.touch();
        debug!("event=field_values_apply module=store status=ok matched={matched}");
        self.commit();
        matched
    }

    /// Sets the selected field. Never touches history.
    pub fn select_field(&mut self, id: Option<FieldId>) {
        self.selected_field_id = id;
    }

    /// Merges title/description and commits immediately.
    pub fn update_form_meta(&mut self, update: FormMetaUpdate) {
        self.flush_pending_commit();
        if let Some(title) = update.title {
            self.form.title = title;
        }
        if let Some(description) = update.description {
            self.form.description = description;
        }
        self.touch();
        self.commit();
    }

    /// Sets the transient dragging flag. Never touches history.
    pub fn set_dragging(&mut self, is_dragging: bool) {
        self.is_dragging = is_dragging;
    }

    /// Ends a drag gesture.
    ///
    /// `None` means the drop landed outside the canvas. Palette drops always
    /// append, whatever field they were dropped onto.
    pub fn finish_drag(&mut self, gesture: Option<DragGesture>) -> bool {
        self.is_dragging = false;
        match gesture {
            None => false,
            Some(DragGesture::Reposition { source, target }) => self.move_field(source, target),
            Some(DragGesture::Palette(kind)) => {
                self.add_field(FieldDraft::palette_default(kind));
                true
            }
        }
    }

    /// Replaces the form with a fresh default and restarts history from it.
    pub fn reset_form(&mut self) {
        let form = Form::new_at(self.clock.now());
        info!("event=form_reset module=store status=ok form_id={}", form.id);
        self.replace_document(form);
        self.is_dragging = false;
    }

    /// Replaces the form wholesale and restarts history from it.
    pub fn load_form(&mut self, form: Form) {
        info!(
            "event=form_load module=store status=ok form_id={} fields={}",
            form.id,
            form.fields.len()
        );
        self.replace_document(form);
    }

    /// Loads a built-in template by title. Returns `false` for unknown titles.
    pub fn load_template(&mut self, title: &str) -> bool {
        match find_template(title) {
            Some(template) => {
                let form = template.instantiate(self.clock.now());
                self.load_form(form);
                true
            }
            None => {
                warn!("event=template_load module=store status=noop reason=not_found");
                false
            }
        }
    }

    /// Imports a form from JSON with a new id and fresh timestamps.
    ///
    /// # Errors
    /// Returns [`ValidationError`] for malformed payloads; the current form,
    /// history and any pending commit are left untouched in that case.
    pub fn import_form(&mut self, json: &str) -> Result<FormId, ValidationError> {
        let form = match parse_form_import(json, self.clock.now()) {
            Ok(form) => form,
            Err(err) => {
                warn!("event=form_import module=store status=error error={err}");
                return Err(err);
            }
        };
        let id = form.id;
        self.load_form(form);
        Ok(id)
    }

    /// Serializes the current form into the JSON export envelope.
    pub fn export_json(&self) -> serde_json::Result<String> {
        export_form_json(&self.form, self.clock.now())
    }

    /// Restores the previous snapshot. Returns `false` when nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.flush_pending_commit();
        match self.history.undo() {
            Some(previous) => {
                self.form = previous.clone();
                self.selected_field_id = None;
                debug!("event=history_undo module=store status=ok");
                true
            }
            None => false,
        }
    }

    /// Re-applies the next snapshot. Returns `false` when nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.flush_pending_commit();
        match self.history.redo() {
            Some(next) => {
                self.form = next.clone();
                self.selected_field_id = None;
                debug!("event=history_redo module=store status=ok");
                true
            }
            None => false,
        }
    }

    /// Commits the pending debounced edit if its deadline has passed.
    pub fn poll_pending_commit(&mut self) -> bool {
        match self.pending_commit_at {
            Some(deadline) if deadline <= self.clock.now() => self.flush_pending_commit(),
            _ => false,
        }
    }

    /// Commits the pending debounced edit right away, if any.
    pub fn flush_pending_commit(&mut self) -> bool {
        if self.pending_commit_at.is_none() {
            return false;
        }
        self.commit();
        true
    }

    /// Records a successful autosave.
    pub fn mark_saved(&mut self, at: DateTime<Utc>) {
        self.last_saved = Some(at);
    }

    fn replace_document(&mut self, form: Form) {
        self.pending_commit_at = None;
        self.form = form;
        self.selected_field_id = None;
        self.history.clear_history();
        self.commit();
    }

    fn touch(&mut self) {
        let now = self.clock.now();
        self.form.touch(now);
    }

    fn commit(&mut self) -> CommitOutcome {
        self.pending_commit_at = None;
        self.history.save_state(self.form.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{FormStore, StoreConfig};
    use crate::clock::ManualClock;
    use crate::model::field::{FieldDraft, FieldPatch, FieldType};
    use chrono::Duration;

    fn store() -> (FormStore<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        (
            FormStore::with_clock(StoreConfig::default(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn new_store_has_empty_history() {
        let (store, _) = store();
        assert!(store.history().present().is_none());
        assert!(!store.can_undo());
        assert!(!store.can_redo());
        assert!(store.form().is_pristine());
    }

    #[test]
    fn poll_before_deadline_keeps_commit_pending() {
        let (mut store, clock) = store();
        let id = store.add_field(FieldDraft::new(FieldType::Text, "A"));
        store.update_field(id, FieldPatch::new().label("AB"));

        clock.advance(Duration::milliseconds(499));
        assert!(!store.poll_pending_commit());
        assert!(store.has_pending_commit());

        clock.advance(Duration::milliseconds(1));
        assert!(store.poll_pending_commit());
        assert!(!store.has_pending_commit());
    }

    #[test]
    fn each_update_pushes_deadline_back() {
        let (mut store, clock) = store();
        let id = store.add_field(FieldDraft::new(FieldType::Text, "A"));
        store.update_field(id, FieldPatch::new().label("AB"));
        clock.advance(Duration::milliseconds(400));
        store.update_field(id, FieldPatch::new().label("ABC"));
        clock.advance(Duration::milliseconds(400));

        assert!(!store.poll_pending_commit());
        assert_eq!(
            store.pending_commit_at(),
            Some(clock_now(&clock) + Duration::milliseconds(100))
        );
    }

    fn clock_now(clock: &ManualClock) -> chrono::DateTime<chrono::Utc> {
        use crate::clock::Clock;
        clock.now()
    }
}
