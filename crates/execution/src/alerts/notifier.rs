//! Notification transports.

use super::{Alert, AlertLevel};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Default Slack endpoint.
pub const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport failures.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("http request failed")]
    Http(#[from] reqwest::Error),

    #[error("endpoint answered {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("endpoint refused the message: {0}")]
    Api(String),

    #[error("{failed} of {total} transports failed")]
    Partial { failed: usize, total: usize },
}

/// A way of delivering alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short transport name for logs.
    fn name(&self) -> &str;

    /// Delivers one alert.
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Writes alerts to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        match alert.level {
            AlertLevel::Info => info!(title = %alert.title, message = %alert.message, "Alert"),
            AlertLevel::Warning => warn!(title = %alert.title, message = %alert.message, "Alert"),
            AlertLevel::Critical => {
                error!(title = %alert.title, message = %alert.message, "Alert")
            }
        }
        Ok(())
    }
}

/// Posts alerts to a Slack-compatible `chat.postMessage` endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    channel: Option<String>,
}

impl WebhookNotifier {
    /// Creates a notifier with a 10 second request timeout.
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        channel: Option<String>,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
            channel,
        })
    }

    /// Returns the endpoint alerts are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request body for an alert.
    pub fn payload(&self, alert: &Alert) -> Value {
        let mut body = json!({ "text": alert.render() });
        if let Some(channel) = &self.channel {
            body["channel"] = Value::String(channel.clone());
        }
        body
    }

    fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|token| {
            if token.starts_with("Bearer ") {
                token.clone()
            } else {
                format!("Bearer {token}")
            }
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        let mut request = self.client.post(&self.url).json(&self.payload(alert));
        if let Some(auth) = self.authorization() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!(status = status.as_u16(), body = %body, "Webhook result");

        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        // Slack answers 200 with {"ok": false, "error": ...} on API errors.
        if let Ok(parsed) = serde_json::from_str::<Value>(&body)
            && parsed.get("ok") == Some(&Value::Bool(false))
        {
            let reason = parsed
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(NotifyError::Api(reason.to_string()));
        }
        Ok(())
    }
}

/// Sends every alert to all inner transports.
#[derive(Clone, Default)]
pub struct MultiNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl MultiNotifier {
    /// Creates an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transport.
    #[must_use]
    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Returns the number of transports.
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Returns true if no transport is registered.
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

#[async_trait]
impl Notifier for MultiNotifier {
    fn name(&self) -> &str {
        "multi"
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        let mut failed = 0;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.send(alert).await {
                warn!(notifier = notifier.name(), error = %e, "Notifier failed");
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(NotifyError::Partial {
                failed,
                total: self.notifiers.len(),
            });
        }
        Ok(())
    }
}
