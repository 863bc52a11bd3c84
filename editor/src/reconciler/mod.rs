//! Submit reconciliation: what happens after Save is pressed
//!
//! [`SubmitReconciler::submit`] picks the method and path, dispatches the
//! request on a spawned task and returns at once with a cancellable
//! [`Submission`]. When the gateway answers, the outcome is reconciled
//! against the attempt it belongs to:
//!
//! - success (2xx): one success notification, then navigation back to where the user came from
//! - failure: one danger notification, no navigation
//! - pending: nothing
//!
//! Only the most recent attempt is tracked. Outcomes for older attempts,
//! repeated outcomes for a settled attempt and anything arriving after
//! [`SubmitReconciler::dispose`] are dropped.

mod route;
#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod tests;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strum::Display;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use route::save_request;

use crate::constants::DEFAULT_RETURN_PATH;
use crate::form::{AssignmentForm, EditMode};
use crate::gateway::{RequestGateway, RequestOutcome, status_failure_message};
use crate::notify::{Navigator, Notification, NotificationSink};

/// Sequence number identifying one call to [`SubmitReconciler::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(u64);

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether a save is in flight
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum ReconcilerState {
    /// No attempt awaiting an outcome
    Idle,
    /// The latest attempt has been dispatched and not yet settled
    Submitting,
}

/// What the success message needs to know about the attempt
#[derive(Debug)]
struct PendingAttempt {
    id:   AttemptId,
    name: String,
    mode: EditMode,
}

#[derive(Debug, Default)]
struct Tracking {
    last_attempt: u64,
    current:      Option<PendingAttempt>,
}

struct Shared {
    gateway:     Arc<dyn RequestGateway>,
    sink:        Arc<dyn NotificationSink>,
    navigator:   Arc<dyn Navigator>,
    return_path: String,
    disposed:    CancellationToken,
    tracking:    Mutex<Tracking>,
}

impl Shared {
    fn tracking(&self) -> MutexGuard<'_, Tracking> {
        self.tracking.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observe(&self, attempt: AttemptId, outcome: RequestOutcome) {
        if !outcome.is_terminal() {
            return;
        }

        // `dispose` cancels under the same lock, so a settled attempt was
        // taken before teardown started
        let settled = {
            let mut tracking = self.tracking();
            if self.disposed.is_cancelled() {
                debug!("Ignoring outcome for attempt {attempt}: editor disposed");
                return;
            }
            tracking.current.take_if(|pending| pending.id == attempt)
        };
        let Some(settled) = settled else {
            debug!("Ignoring outcome for attempt {attempt}: superseded or already settled");
            return;
        };

        match outcome {
            RequestOutcome::Success { status_code } if (200..300).contains(&status_code) => {
                let message = format!(
                    "Assignment {} {} successfully!",
                    settled.name,
                    settled.mode.past_tense()
                );
                info!("Attempt {attempt} succeeded with status {status_code}");
                self.emit_notification(Notification::success(message));
                // The sink may have torn the session down
                if self.disposed.is_cancelled() {
                    debug!("Skipping navigation for attempt {attempt}: editor disposed");
                    return;
                }
                self.navigator.navigate(&self.return_path);
            }
            RequestOutcome::Success { status_code } => {
                self.report_failure(attempt, status_failure_message(status_code));
            }
            RequestOutcome::Failure { message } => self.report_failure(attempt, message),
            RequestOutcome::Pending => {}
        }
    }

    fn report_failure(&self, attempt: AttemptId, message: String) {
        warn!("Attempt {attempt} failed: {message}");
        self.emit_notification(Notification::danger(message));
    }

    fn emit_notification(&self, notification: Notification) {
        if self.disposed.is_cancelled() {
            debug!("Dropping notification after dispose: {}", notification.message);
            return;
        }
        self.sink.notify(notification);
    }

    /// Forget `attempt` without reporting anything
    fn abandon(&self, attempt: AttemptId) {
        if self
            .tracking()
            .current
            .take_if(|pending| pending.id == attempt)
            .is_some()
        {
            debug!("Attempt {attempt} cancelled");
        }
    }
}

/// Owns the submit/outcome cycle of one editing session
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SubmitReconciler {
    shared: Arc<Shared>,
}

impl SubmitReconciler {
    /// Create a reconciler
    ///
    /// `origin` is where the user arrived from; successful saves navigate
    /// back there, or to `/assignments` when it is `None`.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn RequestGateway>,
        sink: Arc<dyn NotificationSink>,
        navigator: Arc<dyn Navigator>,
        origin: Option<String>,
    ) -> Self {
        let return_path = origin
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RETURN_PATH.to_string());

        Self {
            shared: Arc::new(Shared {
                gateway,
                sink,
                navigator,
                return_path,
                disposed: CancellationToken::new(),
                tracking: Mutex::new(Tracking::default()),
            }),
        }
    }

    /// Where the session returns to when it is done
    #[must_use]
    pub fn return_path(&self) -> &str {
        &self.shared.return_path
    }

    /// The navigator the session reports to
    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.shared.navigator.as_ref()
    }

    /// Current state of the submit cycle
    #[must_use]
    pub fn state(&self) -> ReconcilerState {
        if self.shared.tracking().current.is_some() {
            ReconcilerState::Submitting
        } else {
            ReconcilerState::Idle
        }
    }

    /// Whether [`Self::dispose`] has been called
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.is_cancelled()
    }

    /// Save `values` in `mode` without waiting for the answer
    ///
    /// Must be called from within a tokio runtime. The returned handle can
    /// be awaited or cancelled; dropping it leaves the request running.
    /// An update without an identifier is reported as a danger notification
    /// and nothing is sent.
    #[must_use]
    pub fn submit(&self, values: &AssignmentForm, mode: EditMode) -> Submission {
        let cancel = self.shared.disposed.child_token();

        let attempt = {
            let mut tracking = self.shared.tracking();
            tracking.last_attempt += 1;
            AttemptId(tracking.last_attempt)
        };

        if self.is_disposed() {
            debug!("Submit after dispose ignored (attempt {attempt})");
            return Submission::finished(attempt, cancel);
        }

        let request = match save_request(values, mode) {
            Ok(request) => request,
            Err(report) => {
                let message = report.current_context().to_string();
                warn!("Attempt {attempt} rejected before dispatch: {report:?}");
                self.shared.tracking().current = None;
                self.shared.emit_notification(Notification::danger(message));
                return Submission::finished(attempt, cancel);
            }
        };

        self.shared.tracking().current = Some(PendingAttempt {
            id: attempt,
            name: values.name.clone(),
            mode,
        });
        info!(
            "Attempt {attempt}: {} {} for '{}'",
            request.method, request.path, values.name
        );

        let shared = Arc::clone(&self.shared);
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => shared.abandon(attempt),
                outcome = shared.gateway.send(request) => shared.observe(attempt, outcome),
            }
        });

        Submission {
            attempt,
            cancel,
            task: Some(task),
        }
    }

    /// Feed an outcome for `attempt` into the reconciler
    ///
    /// Spawned submissions call this themselves; it is public for hosts that
    /// drive requests on their own. Pending outcomes, stale attempts and
    /// already settled attempts are ignored.
    pub fn observe(&self, attempt: AttemptId, outcome: RequestOutcome) {
        self.shared.observe(attempt, outcome);
    }

    /// Tear the session down
    ///
    /// Outstanding submissions are cancelled and no notification or
    /// navigation is emitted afterwards. Calling it twice is harmless.
    pub fn dispose(&self) {
        if !self.shared.disposed.is_cancelled() {
            debug!("Disposing submit reconciler");
        }
        let mut tracking = self.shared.tracking();
        self.shared.disposed.cancel();
        tracking.current = None;
    }
}

/// Handle to one dispatched save
#[derive(Debug)]
pub struct Submission {
    attempt: AttemptId,
    cancel:  CancellationToken,
    task:    Option<JoinHandle<()>>,
}

impl Submission {
    fn finished(attempt: AttemptId, cancel: CancellationToken) -> Self {
        Self {
            attempt,
            cancel,
            task: None,
        }
    }

    /// Identifier of this attempt
    #[must_use]
    pub const fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Stop tracking this attempt; its outcome will not be reported
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the attempt has been reconciled, cancelled or never dispatched
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait until the attempt's outcome has been handled
    pub async fn settled(self) {
        if let Some(task) = self.task
            && let Err(e) = task.await
        {
            warn!("Submission task for attempt {} ended abnormally: {e}", self.attempt);
        }
    }
}
