//! services/api/src/adapters/notify.rs
//!
//! Notification adapters that do not need a live socket.

use async_trait::async_trait;
use sage_core::ports::NotificationService;
use tokio::sync::Mutex;

/// Collects notifications raised while handling one REST request so the
/// handler can return them in its response body.
#[derive(Default)]
pub struct ResponseNotifier {
    messages: Mutex<Vec<String>>,
}

impl ResponseNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent message, if any was shown.
    pub async fn last(&self) -> Option<String> {
        self.messages.lock().await.last().cloned()
    }
}

#[async_trait]
impl NotificationService for ResponseNotifier {
    async fn show(&self, message: &str, _duration_ms: u64) {
        self.messages.lock().await.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_the_latest_message() {
        let notifier = ResponseNotifier::new();
        assert!(notifier.last().await.is_none());
        notifier.show("Error adding card", 2000).await;
        notifier.show("Added card", 2000).await;
        assert_eq!(notifier.last().await.as_deref(), Some("Added card"));
    }
}
