//! One editing session of an assignment
//!
//! Ties the form values, field bindings and the submit reconciler together
//! the way the editor screen uses them: bind fields, validate on submit,
//! save, close, or jump to one of the assignment's action pages.

mod actions;

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

pub use actions::EditorAction;

use crate::error::Result;
use crate::form::{
    AssignmentForm, EditMode, EditorTab, FieldErrors, FieldName, validate, visible_fields,
};
use crate::reconciler::{ReconcilerState, SubmitReconciler, Submission};

/// What a widget bound to one field needs to render
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    /// Field the binding is for
    pub field:   FieldName,
    /// Input label
    pub label:   &'static str,
    /// Current value
    pub value:   Value,
    /// Validation messages from the last submit attempt
    pub errors:  Vec<String>,
    /// Whether the user has left the field at least once
    pub touched: bool,
}

/// An open assignment editor
///
/// Dropping the editor disposes its reconciler, so an answer that arrives
/// after the user left produces no notification or navigation.
pub struct AssignmentEditor {
    mode:        EditMode,
    form:        AssignmentForm,
    loaded_name: String,
    errors:      FieldErrors,
    touched:     HashSet<FieldName>,
    reconciler:  SubmitReconciler,
}

impl AssignmentEditor {
    /// Open the editor for a new assignment with default values
    #[must_use]
    pub fn create(reconciler: SubmitReconciler) -> Self {
        Self::new(EditMode::Create, AssignmentForm::default(), reconciler)
    }

    /// Open the editor on a loaded record
    #[must_use]
    pub fn update(record: AssignmentForm, reconciler: SubmitReconciler) -> Self {
        Self::new(EditMode::Update, record, reconciler)
    }

    /// Open the editor in `mode` starting from `initial`
    #[must_use]
    pub fn new(mode: EditMode, initial: AssignmentForm, reconciler: SubmitReconciler) -> Self {
        debug!("Opening assignment editor in {mode} mode");
        Self {
            mode,
            loaded_name: initial.name.clone(),
            form: initial,
            errors: FieldErrors::new(),
            touched: HashSet::new(),
            reconciler,
        }
    }

    /// Fixed mode of this session
    #[must_use]
    pub const fn mode(&self) -> EditMode {
        self.mode
    }

    /// Heading for the editor
    #[must_use]
    pub fn title(&self) -> String {
        match self.mode {
            EditMode::Create => "Create Assignment".to_string(),
            EditMode::Update => format!("Update Assignment - {}", self.loaded_name),
        }
    }

    /// Current values
    #[must_use]
    pub const fn form(&self) -> &AssignmentForm {
        &self.form
    }

    /// Mutable access to the values
    pub const fn form_mut(&mut self) -> &mut AssignmentForm {
        &mut self.form
    }

    /// Whether a save is in flight
    #[must_use]
    pub fn state(&self) -> ReconcilerState {
        self.reconciler.state()
    }

    /// Validation errors from the last submit attempt
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Fields of `tab` to show for the current values
    #[must_use]
    pub fn visible_fields(&self, tab: EditorTab) -> Vec<FieldName> {
        visible_fields(&self.form, tab)
    }

    /// Binding data for one field
    pub fn binding(&self, field: FieldName) -> Result<FieldBinding> {
        Ok(FieldBinding {
            field,
            label: field.label(),
            value: self.form.value(field)?,
            errors: self.errors.get(&field).cloned().unwrap_or_default(),
            touched: self.touched.contains(&field),
        })
    }

    /// Change handler: store a new value for `field`
    pub fn set_field(&mut self, field: FieldName, value: Value) -> Result<()> {
        self.form.set_value(field, value)
    }

    /// Blur handler: remember that the user visited `field`
    pub fn touch(&mut self, field: FieldName) {
        self.touched.insert(field);
    }

    /// Validate and save the current values
    ///
    /// Returns the validation errors instead of submitting when the form is
    /// invalid. Submitting does not block; the returned handle resolves once
    /// the outcome has been reported.
    pub fn submit(&mut self) -> std::result::Result<Submission, FieldErrors> {
        self.errors = validate(&self.form);
        if !self.errors.is_empty() {
            self.touched.extend(self.errors.keys().copied());
            debug!("Submit blocked by {} invalid field(s)", self.errors.len());
            return Err(self.errors.clone());
        }

        Ok(self.reconciler.submit(&self.form, self.mode))
    }

    /// Leave the editor without saving
    pub fn close(&self) {
        if !self.reconciler.is_disposed() {
            self.reconciler
                .navigator()
                .navigate(self.reconciler.return_path());
        }
    }

    /// Navigate to one of the assignment's action pages
    ///
    /// Actions tied to a record do nothing until the assignment has an id.
    pub fn perform(&self, action: EditorAction) {
        if self.reconciler.is_disposed() {
            return;
        }
        match action.target(self.form.id) {
            Some(target) => {
                debug!("Editor action {action} -> {target}");
                self.reconciler.navigator().navigate(&target);
            }
            None => warn!("Editor action {action} needs a saved assignment"),
        }
    }
}

impl Drop for AssignmentEditor {
    fn drop(&mut self) {
        self.reconciler.dispose();
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::gateway::RequestOutcome;
    use crate::notify::{EditorEvent, Notification};
    use crate::test_support::Harness;

    #[test]
    fn test_titles_follow_mode() {
        let harness = Harness::new(None);
        let editor = AssignmentEditor::create(harness.reconciler.clone());
        assert_eq!(editor.title(), "Create Assignment");
        assert_eq!(editor.form(), &AssignmentForm::default());

        let record = AssignmentForm {
            id: Some(7),
            name: "HW1".to_string(),
            ..AssignmentForm::default()
        };
        let editor = AssignmentEditor::update(record, Harness::new(None).reconciler);
        assert_eq!(editor.title(), "Update Assignment - HW1");
    }

    #[test]
    fn test_binding_reflects_value_and_touch() {
        let harness = Harness::new(None);
        let mut editor = AssignmentEditor::create(harness.reconciler.clone());

        editor
            .set_field(FieldName::Name, json!("Program 1"))
            .unwrap();
        editor.touch(FieldName::Name);

        let binding = editor.binding(FieldName::Name).unwrap();
        assert_eq!(binding.label, "Assignment Name");
        assert_eq!(binding.value, json!("Program 1"));
        assert!(binding.touched);
        assert!(binding.errors.is_empty());
        assert!(!editor.binding(FieldName::HasTeams).unwrap().touched);
    }

    #[test]
    fn test_visible_fields_follow_edits() {
        let harness = Harness::new(None);
        let mut editor = AssignmentEditor::create(harness.reconciler.clone());
        assert!(
            !editor
                .visible_fields(EditorTab::General)
                .contains(&FieldName::AutoAssignMentors)
        );

        editor
            .set_field(FieldName::HasMentors, json!(true))
            .unwrap();
        assert!(
            editor
                .visible_fields(EditorTab::General)
                .contains(&FieldName::AutoAssignMentors)
        );
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_submitted() {
        let mut harness = Harness::new(None);
        let mut editor = AssignmentEditor::create(harness.reconciler.clone());

        let errors = editor.submit().unwrap_err();

        assert_eq!(errors[&FieldName::Name], vec!["Required".to_string()]);
        let binding = editor.binding(FieldName::Name).unwrap();
        assert_eq!(binding.errors, vec!["Required".to_string()]);
        assert!(binding.touched);
        assert!(harness.gateway.requests().is_empty());
        assert!(harness.drain().is_empty());
    }

    #[tokio::test]
    async fn test_valid_form_is_saved() {
        let mut harness = Harness::new(Some("/courses/2"));
        harness
            .gateway
            .reply(RequestOutcome::Success { status_code: 201 });
        let mut editor = AssignmentEditor::create(harness.reconciler.clone());
        editor.form_mut().name = "HW1".to_string();

        editor.submit().unwrap().settled().await;

        assert!(editor.errors().is_empty());
        assert_eq!(editor.state(), ReconcilerState::Idle);
        assert_eq!(
            harness.drain(),
            vec![
                EditorEvent::Notify(Notification::success("Assignment HW1 created successfully!")),
                EditorEvent::Navigate("/courses/2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_dropping_editor_silences_outstanding_save() {
        let mut harness = Harness::new(None);
        let reply = harness.gateway.reply_later();
        let mut editor = AssignmentEditor::create(harness.reconciler.clone());
        editor.form_mut().name = "HW1".to_string();

        let submission = editor.submit().unwrap();
        harness.gateway.wait_for_requests(1).await;
        drop(editor);

        let _ = reply.send(RequestOutcome::Success { status_code: 201 });
        submission.settled().await;

        assert!(harness.reconciler.is_disposed());
        assert!(harness.drain().is_empty());
    }

    #[test]
    fn test_close_and_actions_navigate() {
        let mut harness = Harness::new(None);
        let record = AssignmentForm {
            id: Some(7),
            name: "HW1".to_string(),
            ..AssignmentForm::default()
        };
        let editor = AssignmentEditor::update(record, harness.reconciler.clone());

        editor.close();
        editor.perform(EditorAction::CreateTeams);
        editor.perform(EditorAction::AddParticipant);

        assert_eq!(
            harness.drain(),
            vec![
                EditorEvent::Navigate("/assignments".to_string()),
                EditorEvent::Navigate("/assignments/edit/7/createteams".to_string()),
                EditorEvent::Navigate("participants".to_string()),
            ]
        );
    }

    #[test]
    fn test_record_actions_need_an_identifier() {
        let mut harness = Harness::new(None);
        let editor = AssignmentEditor::create(harness.reconciler.clone());

        editor.perform(EditorAction::ViewScores);
        editor.perform(EditorAction::AddParticipant);

        assert_eq!(
            harness.drain(),
            vec![EditorEvent::Navigate("participants".to_string())]
        );
    }
}
