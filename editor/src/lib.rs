//! # Assignment editor core
//!
//! Framework-independent core of the assignment editor: form values and
//! their derived views, the HTTP gateway that saves them, and the submit
//! reconciler that turns a save into exactly one user-visible outcome.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use assignment_editor::{
//!     AssignmentEditor, EditorConfig, HttpGateway, SubmitReconciler, TracingNotifier,
//! };
//!
//! # async fn run() -> assignment_editor::Result<()> {
//! let config = EditorConfig::from_env()?;
//! let reconciler = SubmitReconciler::new(
//!     Arc::new(HttpGateway::new(&config)),
//!     Arc::new(TracingNotifier),
//!     Arc::new(TracingNotifier),
//!     None,
//! );
//!
//! let mut editor = AssignmentEditor::create(reconciler);
//! editor.form_mut().name = "HW1".to_string();
//! if let Ok(submission) = editor.submit() {
//!     submission.settled().await;
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod constants;
mod editor;
mod error;
mod form;
mod gateway;
mod logging;
mod notify;
mod reconciler;
#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod test_support;

pub use config::EditorConfig;
pub use editor::{AssignmentEditor, EditorAction, FieldBinding};
pub use error::{Error, Result};
pub use form::{
    AssignmentForm, EditMode, EditorTab, FieldErrors, FieldName, transform_request, validate,
    visible_fields,
};
pub use gateway::{GatewayRequest, HttpGateway, HttpMethod, RequestGateway, RequestOutcome};
pub use logging::LogLevel;
pub use notify::{
    EditorEvent, EventChannel, Navigator, Notification, NotificationSink, NotificationVariant,
    TracingNotifier,
};
pub use reconciler::{AttemptId, ReconcilerState, SubmitReconciler, Submission, save_request};
