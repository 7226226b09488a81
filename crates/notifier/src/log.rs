// In crates/notifier/src/log.rs

use crate::{Notifier, Result, TradeEvent};
use async_trait::async_trait;
use chrono::Utc;

/// Writes events to the application log only. Used when no chat token is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "LogNotifier"
    }

    async fn notify(&self, event: &TradeEvent) -> Result<()> {
        let message = event.message(Utc::now());
        if event.is_error() {
            tracing::error!(target: "notifier", "{}", message);
        } else {
            tracing::info!(target: "notifier", "{}", message);
        }
        Ok(())
    }
}
