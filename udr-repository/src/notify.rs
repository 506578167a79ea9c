//! Change notification contract.
//!
//! After a successful patch the repository hands a [`DataChangeNotification`]
//! to a [`ChangeNotifier`]. Delivery (callback URIs, retries, fan-out) is the
//! notifier's concern; the repository only guarantees that notifications are
//! emitted after the write succeeded and never for a failed write.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use udr_model::DocumentSnapshot;
use udr_types::SubscriberScope;

/// Errors a notifier may report. Never propagated to the writer.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The consumer could not be reached.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// The change as the client submitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "kebab-case")]
pub enum SubmittedChange {
    /// RFC 6902 operation list.
    Operations(Vec<Value>),
    /// RFC 7396 merge document.
    MergeDocument(Value),
}

/// A persisted change to one subscriber's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataChangeNotification {
    /// Whose data changed.
    pub subscriber_id: SubscriberScope,
    /// Resource path of the changed document.
    pub resource_uri: String,
    /// The change as submitted.
    pub submitted: SubmittedChange,
    /// Document before the change.
    pub old: DocumentSnapshot,
    /// Document as persisted after the change.
    pub new: DocumentSnapshot,
}

/// Receives notifications for persisted changes.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn notify(&self, notification: DataChangeNotification) -> Result<(), NotifyError>;
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl ChangeNotifier for NoopNotifier {
    async fn notify(&self, _notification: DataChangeNotification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// A recording notifier for testing.
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Keeps every notification it receives, optionally failing delivery.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        received: Mutex<Vec<DataChangeNotification>>,
        failing: AtomicBool,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// A notifier that records, then reports a delivery failure.
        pub fn failing() -> Self {
            let notifier = Self::default();
            notifier.failing.store(true, Ordering::SeqCst);
            notifier
        }

        /// Notifications received so far.
        pub fn received(&self) -> Vec<DataChangeNotification> {
            self.received.lock().clone()
        }

        pub fn count(&self) -> usize {
            self.received.lock().len()
        }
    }

    #[async_trait]
    impl ChangeNotifier for RecordingNotifier {
        async fn notify(&self, notification: DataChangeNotification) -> Result<(), NotifyError> {
            self.received.lock().push(notification);
            if self.failing.load(Ordering::SeqCst) {
                return Err(NotifyError::Delivery("consumer unreachable".into()));
            }
            Ok(())
        }
    }
}
