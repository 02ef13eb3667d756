//! Best-effort alert delivery.

use super::{Alert, ConsoleNotifier, MultiNotifier, Notifier, NotifyError, SLACK_POST_MESSAGE_URL, WebhookNotifier};
use crate::config::NotificationConfig;
use std::sync::Arc;
use tracing::warn;

/// Delivers alerts without ever failing the caller.
#[derive(Clone)]
pub struct NotificationSink {
    notifier: Arc<dyn Notifier>,
}

impl NotificationSink {
    /// Creates a new sink over `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Console transport only.
    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleNotifier))
    }

    /// Console transport plus a webhook when one is configured.
    pub fn from_config(config: &NotificationConfig) -> Result<Self, NotifyError> {
        let mut multi = MultiNotifier::new().with(Arc::new(ConsoleNotifier));
        if config.webhook_enabled() {
            let url = config
                .webhook_url
                .clone()
                .unwrap_or_else(|| SLACK_POST_MESSAGE_URL.to_string());
            let token = (!config.token.is_empty()).then(|| config.token.expose().to_string());
            multi = multi.with(Arc::new(WebhookNotifier::new(
                url,
                token,
                config.channel.clone(),
            )?));
        }
        Ok(Self::new(Arc::new(multi)))
    }

    /// Sends an alert; transport errors are logged and dropped.
    pub async fn send(&self, alert: Alert) {
        if let Err(e) = self.notifier.send(&alert).await {
            warn!(
                notifier = self.notifier.name(),
                title = %alert.title,
                error = %e,
                "Failed to send notification"
            );
        }
    }
}
