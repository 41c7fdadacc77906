use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sepaq::Cabin;
use tracing::{error, info};

use crate::executor::{Alerter, NotificationError};

/// Title and application name of desktop notifications
pub const APP_NAME: &str = "Sepaq Crawler";

/// Implementation of alert service that prints matches and optionally shows them on the desktop
pub struct CabinAlertService {
    desktop_service: Option<Arc<dyn DesktopService>>,
}

/// Trait for desktop notification implementations
#[async_trait]
pub trait DesktopService: Send + Sync {
    /// Show a notification
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotificationError>;
}

impl CabinAlertService {
    /// Create an alert service, with desktop notifications when a service is given
    pub fn new(desktop_service: Option<Arc<dyn DesktopService>>) -> Self {
        Self { desktop_service }
    }

    /// Line printed on standard output for a match
    pub fn console_line(cabin: &Cabin) -> String {
        format!(
            "Found Cabin {} ({}): {}",
            cabin.name(),
            cabin.park().name(),
            cabin.url()
        )
    }

    /// Body of the desktop notification for a match
    pub fn desktop_message(cabin: &Cabin) -> String {
        format!("Found a cabin in {}: {}", cabin.park().name(), cabin.name())
    }
}

#[async_trait]
impl Alerter for CabinAlertService {
    async fn alert(&self, cabin: &Cabin) -> Result<(), NotificationError> {
        let line = Self::console_line(cabin);

        writeln!(std::io::stdout().lock(), "{}", line)
            .map_err(|e| NotificationError::Console(e.to_string()))?;

        if let Some(ref desktop_service) = self.desktop_service {
            let message = Self::desktop_message(cabin);

            match desktop_service.notify(APP_NAME, &message).await {
                Ok(()) => info!("Desktop notification sent for {}", cabin.name()),
                Err(e) => {
                    error!("Failed to show desktop notification: {}", e);
                    return Err(e);
                }
            }
        }

        Ok(())
    }
}

/// Mock desktop service for development/testing
#[derive(Default)]
pub struct MockDesktopService {
    sent: Mutex<Vec<(String, String)>>,
}

impl MockDesktopService {
    /// Notifications shown so far, as `(title, message)` pairs
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DesktopService for MockDesktopService {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotificationError> {
        info!("🔔 [MOCK DESKTOP] {}: {}", title, message);

        self.sent
            .lock()
            .map_err(|e| NotificationError::Desktop(e.to_string()))?
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_console_line() {
        let cabin = cabin("Le Huard", "Jacques-Cartier");

        assert_eq!(
            CabinAlertService::console_line(&cabin),
            "Found Cabin Le Huard (Jacques-Cartier): https://www.sepaq.com/en/cabins/le-huard"
        );
    }

    #[tokio::test]
    async fn test_desktop_notification_names_the_park() {
        let desktop = Arc::new(MockDesktopService::default());
        let service = CabinAlertService::new(Some(desktop.clone()));

        service
            .alert(&cabin("Le Huard", "Jacques-Cartier"))
            .await
            .unwrap();

        assert_eq!(
            desktop.sent(),
            vec![(
                "Sepaq Crawler".to_string(),
                "Found a cabin in Jacques-Cartier: Le Huard".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_console_only() {
        let service = CabinAlertService::new(None);
        assert!(service.alert(&cabin("La Loutre", "Frontenac")).await.is_ok());
    }
}
