//! Output collaborators: notifications for the user and navigation requests
//!
//! The reconciler receives these as injected trait objects instead of
//! reaching for a global dispatcher.

use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

/// Presentation style of a notification
#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    /// Operation completed
    Success,
    /// Operation failed
    Danger,
}

/// A message for the alert presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Presentation style
    pub variant: NotificationVariant,
    /// Text shown to the user
    pub message: String,
}

impl Notification {
    /// Build a success notification
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            variant: NotificationVariant::Success,
            message: message.into(),
        }
    }

    /// Build a danger notification
    #[must_use]
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            variant: NotificationVariant::Danger,
            message: message.into(),
        }
    }

    /// Whether this notification reports a failure
    #[must_use]
    pub fn is_danger(&self) -> bool {
        self.variant == NotificationVariant::Danger
    }
}

/// Receives user-facing notifications
pub trait NotificationSink: Send + Sync {
    /// Show `notification` to the user
    fn notify(&self, notification: Notification);
}

/// Receives navigation instructions
pub trait Navigator: Send + Sync {
    /// Move the user to `path`
    fn navigate(&self, path: &str);
}

/// Sink and navigator that only write to the trace log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.variant {
            NotificationVariant::Success => info!("{}", notification.message),
            NotificationVariant::Danger => warn!("{}", notification.message),
        }
    }
}

impl Navigator for TracingNotifier {
    fn navigate(&self, path: &str) {
        info!("Navigate to {path}");
    }
}

/// Everything the editor asks its surroundings to do, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// A notification was emitted
    Notify(Notification),
    /// A navigation was requested
    Navigate(String),
}

/// Sink and navigator that forward events to a channel
///
/// A UI loop (or a test) drains the receiving half. Once the receiver is
/// dropped, events are discarded.
#[derive(Debug, Clone)]
pub struct EventChannel {
    sender: UnboundedSender<EditorEvent>,
}

impl EventChannel {
    /// Create the channel and its receiving half
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<EditorEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    fn forward(&self, event: EditorEvent) {
        if self.sender.send(event).is_err() {
            debug!("Editor event dropped: receiver closed");
        }
    }
}

impl NotificationSink for EventChannel {
    fn notify(&self, notification: Notification) {
        self.forward(EditorEvent::Notify(notification));
    }
}

impl Navigator for EventChannel {
    fn navigate(&self, path: &str) {
        self.forward(EditorEvent::Navigate(path.to_string()));
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
    use super::*;

    #[test]
    fn test_notification_wire_format() {
        let json = serde_json::to_value(Notification::danger("Name already taken")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"variant": "danger", "message": "Name already taken"})
        );
    }

    #[test]
    fn test_event_channel_preserves_order() {
        let (channel, mut rx) = EventChannel::new();
        channel.notify(Notification::success("saved"));
        channel.navigate("/assignments");

        assert_eq!(
            rx.try_recv().unwrap(),
            EditorEvent::Notify(Notification::success("saved"))
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            EditorEvent::Navigate("/assignments".to_string())
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_channel_tolerates_closed_receiver() {
        let (channel, rx) = EventChannel::new();
        drop(rx);
        channel.notify(Notification::danger("ignored"));
        channel.navigate("/assignments");
    }
}
