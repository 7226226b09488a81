// In crates/notifier/src/lib.rs

use async_trait::async_trait;

pub mod error;
pub mod event;
pub mod line;
pub mod log;

// Re-export public types
pub use error::{Error, Result};
pub use event::TradeEvent;
pub use line::LineNotifier;
pub use log::LogNotifier;

/// Delivers trade events to the operator.
///
/// Callers treat delivery as fire-and-forget: a failed send is logged by the
/// caller and never changes trading state.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// The name of the notifier (e.g., "LineNotifier").
    fn name(&self) -> &'static str;

    async fn notify(&self, event: &TradeEvent) -> Result<()>;
}
