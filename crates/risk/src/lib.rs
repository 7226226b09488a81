// In crates/risk/src/lib.rs

pub mod error;
pub mod exits;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use exits::{ExitReason, ProtectiveExits};
pub use types::ExitSettings;
