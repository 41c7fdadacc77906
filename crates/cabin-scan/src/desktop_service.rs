use async_trait::async_trait;
use notify_rust::Notification;
use tracing::debug;

use crate::{DesktopService, NotificationError};

/// Desktop notifications through the platform notification service
pub struct NotifyRustService {
    app_name: String,
}

impl NotifyRustService {
    /// Create a service showing notifications under `app_name`
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[async_trait]
impl DesktopService for NotifyRustService {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotificationError> {
        debug!("Showing desktop notification: {}", message);

        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(title)
            .body(message);

        // Talking to the notification daemon blocks
        let shown = tokio::task::spawn_blocking(move || {
            notification.show().map(|_| ()).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| NotificationError::Desktop(e.to_string()))?;

        shown.map_err(NotificationError::Desktop)
    }
}
