pub mod bridge;
mod bridge_tests;

pub use bridge::LogBridge;
pub use bridge::LogCompletion;
pub use bridge::LogEntry;
