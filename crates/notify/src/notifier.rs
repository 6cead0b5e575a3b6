//! Permission-gated delivery.

use std::sync::Arc;

use thiserror::Error;

use crate::notification::Notification;
use crate::permission::PermissionState;
use crate::sink::NotificationSink;

/// A sink failed to post after permission was granted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// What happened to a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Permission was not granted; nothing was posted and permission was
    /// requested again.
    Suppressed,
}

/// Front door for posting notifications.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl core::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Notifier")
            .field("permission", &self.sink.permission())
            .finish()
    }
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Post `notification` if permitted.
    ///
    /// Missing permission is not an error: the call becomes a no-op after
    /// asking the sink to request permission.
    pub fn notify(&self, notification: &Notification) -> Result<DeliveryOutcome, NotifyError> {
        let permission = self.sink.permission();
        if !permission.is_granted() {
            tracing::debug!(%permission, title = %notification.title, "notification suppressed");
            let answer = self.sink.request_permission();
            tracing::debug!(permission = %answer, "permission requested");
            return Ok(DeliveryOutcome::Suppressed);
        }

        self.sink.deliver(notification)?;
        Ok(DeliveryOutcome::Delivered)
    }

    /// Ask for permission up front and confirm a grant to the user.
    ///
    /// On `Granted` the [`Notification::permission_confirmed`] message is
    /// posted; any other answer is returned without posting.
    pub fn request_permission(&self) -> Result<PermissionState, NotifyError> {
        let permission = self.sink.request_permission();
        tracing::info!(%permission, "notification permission requested");

        if permission.is_granted() {
            self.sink.deliver(&Notification::permission_confirmed())?;
        }
        Ok(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;

    fn sample() -> Notification {
        Notification {
            title: "title".to_string(),
            body: "body".to_string(),
        }
    }

    #[test]
    fn granted_permission_delivers() {
        let sink = Arc::new(RecordingSink::granted());
        let notifier = Notifier::new(sink.clone());

        assert_eq!(notifier.notify(&sample()), Ok(DeliveryOutcome::Delivered));
        assert_eq!(sink.delivered(), vec![sample()]);
        assert_eq!(sink.permission_requests(), 0);
    }

    #[test]
    fn denied_permission_is_a_silent_no_op() {
        let sink = Arc::new(RecordingSink::new(PermissionState::Denied));
        let notifier = Notifier::new(sink.clone());

        assert_eq!(notifier.notify(&sample()), Ok(DeliveryOutcome::Suppressed));
        assert!(sink.delivered().is_empty());
        assert_eq!(sink.permission_requests(), 1);
    }

    #[test]
    fn permission_is_checked_on_every_call() {
        let sink = Arc::new(RecordingSink::new(PermissionState::Undetermined));
        let notifier = Notifier::new(sink.clone());

        assert_eq!(notifier.notify(&sample()), Ok(DeliveryOutcome::Suppressed));
        sink.set_permission(PermissionState::Granted);
        assert_eq!(notifier.notify(&sample()), Ok(DeliveryOutcome::Delivered));
        assert_eq!(sink.delivered().len(), 1);
    }

    struct BrokenSink;

    impl NotificationSink for BrokenSink {
        fn permission(&self) -> PermissionState {
            PermissionState::Granted
        }

        fn deliver(&self, _notification: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("manager unavailable".to_string()))
        }
    }

    #[test]
    fn sink_failure_propagates() {
        let notifier = Notifier::new(Arc::new(BrokenSink));

        assert!(matches!(
            notifier.notify(&sample()),
            Err(NotifyError::Delivery(_))
        ));
    }

    #[test]
    fn granted_request_posts_confirmation() {
        let sink = Arc::new(
            RecordingSink::new(PermissionState::Undetermined)
                .answer_requests_with(PermissionState::Granted),
        );
        let notifier = Notifier::new(sink.clone());

        assert_eq!(notifier.request_permission(), Ok(PermissionState::Granted));
        assert_eq!(sink.permission_requests(), 1);
        assert_eq!(sink.delivered(), vec![Notification::permission_confirmed()]);
    }

    #[test]
    fn refused_request_posts_nothing() {
        let sink = Arc::new(
            RecordingSink::new(PermissionState::Undetermined)
                .answer_requests_with(PermissionState::Denied),
        );
        let notifier = Notifier::new(sink.clone());

        assert_eq!(notifier.request_permission(), Ok(PermissionState::Denied));
        assert!(sink.delivered().is_empty());
        assert_eq!(sink.permission(), PermissionState::Denied);
    }
}
