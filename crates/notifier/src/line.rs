// In crates/notifier/src/line.rs

use crate::{Error, LogNotifier, Notifier, Result, TradeEvent};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;

const LINE_NOTIFY_URL: &str = "https://notify-api.line.me/api/notify";

/// Sends events to LINE Notify, and to the application log.
pub struct LineNotifier {
    client: reqwest::Client,
    token: String,
    endpoint: String,
}

impl LineNotifier {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            token: token.into(),
            endpoint: LINE_NOTIFY_URL.to_string(),
        })
    }

    /// Points the notifier at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Notifier for LineNotifier {
    fn name(&self) -> &'static str {
        "LineNotifier"
    }

    async fn notify(&self, event: &TradeEvent) -> Result<()> {
        // The log copy is written even when the push fails.
        LogNotifier.notify(event).await?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .form(&[("message", format!("\n{}", event.message(Utc::now())))])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("LINE notification delivered.");
        Ok(())
    }
}
