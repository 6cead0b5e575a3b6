//! Notification payloads.

use serde::{Deserialize, Serialize};

/// A local notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Channel metadata registered with the platform before the first post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self {
            id: "expiration_notifications".to_string(),
            name: "Expiration Notifications".to_string(),
            description: "Notifications for products nearing expiration".to_string(),
        }
    }
}

/// Static title plus a body template.
///
/// The body may reference `{name}` and `{days}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    pub title: String,
    pub body: String,
}

impl Default for NotificationTemplate {
    fn default() -> Self {
        Self {
            title: "消費期限が近づいています".to_string(),
            body: "{name}の消費期限が{days}日後です".to_string(),
        }
    }
}

impl NotificationTemplate {
    /// Fill in `{name}` and `{days}`.
    ///
    /// The template is scanned once, so placeholder-like text inside `name`
    /// is copied through untouched.
    pub fn render(&self, name: &str, days_remaining: i64) -> Notification {
        let mut body = String::with_capacity(self.body.len() + name.len());
        let mut rest = self.body.as_str();

        while let Some(start) = rest.find('{') {
            body.push_str(&rest[..start]);
            let tail = &rest[start..];
            if let Some(after) = tail.strip_prefix("{name}") {
                body.push_str(name);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{days}") {
                body.push_str(&days_remaining.to_string());
                rest = after;
            } else {
                body.push('{');
                rest = &tail[1..];
            }
        }
        body.push_str(rest);

        Notification {
            title: self.title.clone(),
            body,
        }
    }
}

impl Notification {
    /// Posted once notification permission has been confirmed.
    pub fn permission_confirmed() -> Self {
        Self {
            title: "通知の設定".to_string(),
            body: "アクセスの許可を確認しました".to_string(),
        }
    }
}
