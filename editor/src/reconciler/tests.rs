//! Tests for the submit/outcome cycle

use std::sync::{OnceLock, mpsc};

use super::*;
use crate::gateway::HttpMethod;
use crate::notify::EditorEvent;
use crate::test_support::{Harness, ScriptedGateway};

fn named(name: &str) -> AssignmentForm {
    AssignmentForm {
        name: name.to_string(),
        ..AssignmentForm::default()
    }
}

fn loaded(id: u64, name: &str) -> AssignmentForm {
    AssignmentForm {
        id: Some(id),
        ..named(name)
    }
}

fn success(message: &str) -> EditorEvent {
    EditorEvent::Notify(Notification::success(message))
}

fn danger(message: &str) -> EditorEvent {
    EditorEvent::Notify(Notification::danger(message))
}

fn navigate(path: &str) -> EditorEvent {
    EditorEvent::Navigate(path.to_string())
}

#[tokio::test]
async fn test_create_issues_one_post() {
    let mut harness = Harness::new(None);
    harness
        .gateway
        .reply(RequestOutcome::Success { status_code: 201 });

    harness
        .reconciler
        .submit(&named("HW1"), EditMode::Create)
        .settled()
        .await;

    let requests = harness.gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].path, "/assignments");
    assert_eq!(requests[0].body["assignment"]["name"], "HW1");
    assert_eq!(harness.drain().len(), 2);
}

#[tokio::test]
async fn test_update_issues_one_patch_to_record() {
    let harness = Harness::new(None);
    harness
        .gateway
        .reply(RequestOutcome::Success { status_code: 200 });

    harness
        .reconciler
        .submit(&loaded(7, "HW1"), EditMode::Update)
        .settled()
        .await;

    let requests = harness.gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Patch);
    assert_eq!(requests[0].path, "/assignments/7");
}

#[tokio::test]
async fn test_success_notifies_then_navigates_to_default() {
    let mut harness = Harness::new(None);
    harness
        .gateway
        .reply(RequestOutcome::Success { status_code: 201 });

    harness
        .reconciler
        .submit(&named("HW1"), EditMode::Create)
        .settled()
        .await;

    assert_eq!(
        harness.drain(),
        vec![
            success("Assignment HW1 created successfully!"),
            navigate("/assignments"),
        ]
    );
    assert_eq!(harness.reconciler.state(), ReconcilerState::Idle);
}

#[tokio::test]
async fn test_success_navigates_to_origin() {
    let mut harness = Harness::new(Some("/courses/4/assignments"));
    harness
        .gateway
        .reply(RequestOutcome::Success { status_code: 200 });

    harness
        .reconciler
        .submit(&loaded(9, "Final Project"), EditMode::Update)
        .settled()
        .await;

    assert_eq!(
        harness.drain(),
        vec![
            success("Assignment Final Project updated successfully!"),
            navigate("/courses/4/assignments"),
        ]
    );
}

#[tokio::test]
async fn test_failure_notifies_without_navigation() {
    let mut harness = Harness::new(None);
    harness
        .gateway
        .reply(RequestOutcome::failure("Name already taken"));

    harness
        .reconciler
        .submit(&named("HW1"), EditMode::Create)
        .settled()
        .await;

    assert_eq!(harness.drain(), vec![danger("Name already taken")]);
    assert_eq!(harness.reconciler.state(), ReconcilerState::Idle);
}

#[tokio::test]
async fn test_failed_values_can_be_resubmitted() {
    let mut harness = Harness::new(None);
    harness.gateway.reply(RequestOutcome::failure("Server busy"));
    harness
        .gateway
        .reply(RequestOutcome::Success { status_code: 201 });

    let values = named("HW1");
    harness
        .reconciler
        .submit(&values, EditMode::Create)
        .settled()
        .await;
    harness
        .reconciler
        .submit(&values, EditMode::Create)
        .settled()
        .await;

    assert_eq!(harness.gateway.requests().len(), 2);
    assert_eq!(
        harness.drain(),
        vec![
            danger("Server busy"),
            success("Assignment HW1 created successfully!"),
            navigate("/assignments"),
        ]
    );
}

#[tokio::test]
async fn test_update_without_identifier_is_not_dispatched() {
    let mut harness = Harness::new(None);

    let submission = harness
        .reconciler
        .submit(&named("HW1"), EditMode::Update);
    assert!(submission.is_finished());
    submission.settled().await;

    assert!(harness.gateway.requests().is_empty());
    assert_eq!(
        harness.drain(),
        vec![danger("Cannot update assignment: missing identifier")]
    );
    assert_eq!(harness.reconciler.state(), ReconcilerState::Idle);
}

#[tokio::test]
async fn test_non_success_status_is_reported_as_failure() {
    let mut harness = Harness::new(None);
    harness
        .gateway
        .reply(RequestOutcome::Success { status_code: 304 });

    harness
        .reconciler
        .submit(&named("HW1"), EditMode::Create)
        .settled()
        .await;

    assert_eq!(
        harness.drain(),
        vec![danger("Request failed with status code 304")]
    );
}

#[tokio::test]
async fn test_pending_observations_are_inert() {
    let mut harness = Harness::new(None);
    let reply = harness.gateway.reply_later();

    let submission = harness
        .reconciler
        .submit(&named("HW1"), EditMode::Create);
    harness.gateway.wait_for_requests(1).await;
    assert_eq!(harness.reconciler.state(), ReconcilerState::Submitting);

    for _ in 0..3 {
        harness
            .reconciler
            .observe(submission.attempt(), RequestOutcome::Pending);
    }
    assert!(harness.drain().is_empty());
    assert_eq!(harness.reconciler.state(), ReconcilerState::Submitting);

    reply
        .send(RequestOutcome::Success { status_code: 201 })
        .unwrap();
    submission.settled().await;

    assert_eq!(harness.drain().len(), 2);
}

#[tokio::test]
async fn test_settled_attempt_ignores_repeated_outcomes() {
    let mut harness = Harness::new(None);
    harness
        .gateway
        .reply(RequestOutcome::Success { status_code: 201 });

    let submission = harness
        .reconciler
        .submit(&named("HW1"), EditMode::Create);
    let attempt = submission.attempt();
    submission.settled().await;
    assert_eq!(harness.drain().len(), 2);

    harness
        .reconciler
        .observe(attempt, RequestOutcome::Success { status_code: 201 });
    harness
        .reconciler
        .observe(attempt, RequestOutcome::failure("late"));

    assert!(harness.drain().is_empty());
}

#[tokio::test]
async fn test_dispose_before_outcome_suppresses_everything() {
    let mut harness = Harness::new(None);
    let reply = harness.gateway.reply_later();

    let submission = harness
        .reconciler
        .submit(&named("HW1"), EditMode::Create);
    let attempt = submission.attempt();
    harness.gateway.wait_for_requests(1).await;

    harness.reconciler.dispose();
    // The task may already be gone, so the send can fail
    let _ = reply.send(RequestOutcome::Success { status_code: 201 });
    submission.settled().await;

    harness
        .reconciler
        .observe(attempt, RequestOutcome::Success { status_code: 201 });

    assert!(harness.drain().is_empty());
    assert!(harness.reconciler.is_disposed());
    assert_eq!(harness.reconciler.state(), ReconcilerState::Idle);
}

#[tokio::test]
async fn test_submit_after_dispose_does_nothing() {
    let mut harness = Harness::new(None);
    harness.reconciler.dispose();

    harness
        .reconciler
        .submit(&named("HW1"), EditMode::Create)
        .settled()
        .await;

    assert!(harness.gateway.requests().is_empty());
    assert!(harness.drain().is_empty());
}

#[tokio::test]
async fn test_latest_submission_wins() {
    let mut harness = Harness::new(None);
    let first_reply = harness.gateway.reply_later();
    harness
        .gateway
        .reply(RequestOutcome::Success { status_code: 201 });

    let first = harness
        .reconciler
        .submit(&named("HW1"), EditMode::Create);
    harness.gateway.wait_for_requests(1).await;

    let second = harness
        .reconciler
        .submit(&named("HW2"), EditMode::Create);
    assert!(second.attempt() > first.attempt());
    second.settled().await;

    first_reply
        .send(RequestOutcome::failure("first attempt failed"))
        .unwrap();
    first.settled().await;

    assert_eq!(
        harness.drain(),
        vec![
            success("Assignment HW2 created successfully!"),
            navigate("/assignments"),
        ]
    );
}

#[tokio::test]
async fn test_cancelled_submission_reports_nothing() {
    let mut harness = Harness::new(None);
    let _reply = harness.gateway.reply_later();

    let submission = harness
        .reconciler
        .submit(&named("HW1"), EditMode::Create);
    harness.gateway.wait_for_requests(1).await;

    submission.cancel();
    submission.settled().await;

    assert!(harness.drain().is_empty());
    assert_eq!(harness.reconciler.state(), ReconcilerState::Idle);
    assert!(!harness.reconciler.is_disposed());
}

#[test]
fn test_blank_origin_falls_back_to_assignments() {
    let harness = Harness::new(Some("  "));
    assert_eq!(harness.reconciler.return_path(), "/assignments");
}

/// Navigator that only records the paths it was sent to
#[derive(Default)]
struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

/// Sink that parks inside `notify` until the test releases it
struct ParkedSink {
    entered: mpsc::Sender<()>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl NotificationSink for ParkedSink {
    fn notify(&self, _notification: Notification) {
        let _ = self.entered.send(());
        let _ = self.release.lock().unwrap().recv();
    }
}

/// Sink that tears the session down from inside its handler
#[derive(Default)]
struct ClosingSink {
    reconciler: OnceLock<SubmitReconciler>,
    seen:       Mutex<Vec<Notification>>,
}

impl NotificationSink for ClosingSink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
        if let Some(reconciler) = self.reconciler.get() {
            reconciler.dispose();
        }
    }
}

fn reconciler_with(
    sink: Arc<dyn NotificationSink>,
    navigator: Arc<dyn Navigator>,
) -> SubmitReconciler {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.reply(RequestOutcome::Success { status_code: 201 });
    let gateway: Arc<dyn RequestGateway> = gateway;
    SubmitReconciler::new(gateway, sink, navigator, None)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dispose_while_notifying_skips_navigation() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let navigator = Arc::new(RecordingNavigator::default());
    let reconciler = reconciler_with(
        Arc::new(ParkedSink {
            entered: entered_tx,
            release: Mutex::new(release_rx),
        }),
        navigator.clone(),
    );

    let submission = reconciler.submit(&named("HW1"), EditMode::Create);
    // The success handler is now parked on a worker thread
    entered_rx.recv().unwrap();
    reconciler.dispose();
    assert!(reconciler.is_disposed());
    release_tx.send(()).unwrap();
    submission.settled().await;

    assert!(navigator.paths.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_sink_closing_the_session_skips_navigation() {
    let sink = Arc::new(ClosingSink::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let reconciler = reconciler_with(sink.clone(), navigator.clone());
    assert!(sink.reconciler.set(reconciler.clone()).is_ok());

    reconciler
        .submit(&named("HW1"), EditMode::Create)
        .settled()
        .await;

    assert_eq!(
        *sink.seen.lock().unwrap(),
        vec![Notification::success("Assignment HW1 created successfully!")]
    );
    assert!(reconciler.is_disposed());
    assert!(navigator.paths.lock().unwrap().is_empty());
}
