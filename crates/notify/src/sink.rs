//! Notification sink port and in-process implementations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::notification::{Notification, NotificationChannel};
use crate::notifier::NotifyError;
use crate::permission::PermissionState;

/// Where notifications end up (OS notification manager, log, test buffer...).
pub trait NotificationSink: Send + Sync + 'static {
    /// Current permission to post.
    fn permission(&self) -> PermissionState;

    /// Post a notification. Only called after `permission()` returned `Granted`.
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Ask the platform for permission and return the state it settled on.
    fn request_permission(&self) -> PermissionState {
        self.permission()
    }
}

/// Sink that writes notifications to the tracing pipeline.
#[derive(Debug, Clone)]
pub struct TracingSink {
    channel: NotificationChannel,
    permission: PermissionState,
}

impl TracingSink {
    pub fn new(channel: NotificationChannel, permission: PermissionState) -> Self {
        Self {
            channel,
            permission,
        }
    }

    pub fn channel(&self) -> &NotificationChannel {
        &self.channel
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(NotificationChannel::default(), PermissionState::Granted)
    }
}

impl NotificationSink for TracingSink {
    fn permission(&self) -> PermissionState {
        self.permission
    }

    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            channel = %self.channel.id,
            title = %notification.title,
            body = %notification.body,
            "notification posted"
        );
        Ok(())
    }

    fn request_permission(&self) -> PermissionState {
        if !self.permission.is_granted() {
            tracing::warn!(
                channel = %self.channel.id,
                permission = %self.permission,
                "notification permission not granted; requesting"
            );
        }
        self.permission
    }
}

/// Sink that keeps every delivered notification in memory.
///
/// A permission request can be scripted to flip the permission, standing in
/// for the user answering the platform prompt.
#[derive(Debug)]
pub struct RecordingSink {
    permission: Mutex<PermissionState>,
    answer: Mutex<Option<PermissionState>>,
    delivered: Mutex<Vec<Notification>>,
    permission_requests: AtomicUsize,
}

impl RecordingSink {
    pub fn new(permission: PermissionState) -> Self {
        Self {
            permission: Mutex::new(permission),
            answer: Mutex::new(None),
            delivered: Mutex::new(Vec::new()),
            permission_requests: AtomicUsize::new(0),
        }
    }

    pub fn granted() -> Self {
        Self::new(PermissionState::Granted)
    }

    /// Permission the next requests resolve to.
    pub fn answer_requests_with(self, answer: PermissionState) -> Self {
        *self
            .answer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(answer);
        self
    }

    pub fn set_permission(&self, permission: PermissionState) {
        *self
            .permission
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = permission;
    }

    /// Everything delivered so far, in delivery order.
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::granted()
    }
}

impl NotificationSink for RecordingSink {
    fn permission(&self) -> PermissionState {
        *self
            .permission
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification.clone());
        Ok(())
    }

    fn request_permission(&self) -> PermissionState {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        let answer = *self
            .answer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(answer) = answer {
            self.set_permission(answer);
        }
        self.permission()
    }
}
