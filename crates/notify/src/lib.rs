//! `shelflife-notify`
//!
//! **Responsibility:** local notification boundary.
//!
//! The OS notification and permission subsystems are external; this crate
//! models them as a [`NotificationSink`] port with an explicit permission
//! capability query. [`Notifier`] checks that capability before every delivery
//! and treats anything short of `Granted` as a silent no-op.

pub mod notification;
pub mod notifier;
pub mod permission;
pub mod sink;

pub use notification::{Notification, NotificationChannel, NotificationTemplate};
pub use notifier::{DeliveryOutcome, Notifier, NotifyError};
pub use permission::PermissionState;
pub use sink::{NotificationSink, RecordingSink, TracingSink};
