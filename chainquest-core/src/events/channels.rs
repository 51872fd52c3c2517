//! Notification channel factory and handles.

use super::types::Notification;
use tokio::sync::broadcast;

/// Buffer size of the notification channel.
///
/// A subscriber lagging by more than this many notifications skips ahead.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for notifications.
pub type NotificationSender = broadcast::Sender<Notification>;
/// Receiver handle for notifications.
pub type NotificationReceiver = broadcast::Receiver<Notification>;

/// Create a new notification channel.
///
/// Further receivers are made with [`broadcast::Sender::subscribe`].
pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    broadcast::channel(DEFAULT_CHANNEL_BUFFER)
}
