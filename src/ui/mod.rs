//! Display-facing views: the action log and agent snapshots

pub mod log;
pub mod snapshot;

pub use log::{ActionLog, LogCategory, LogEntry};
pub use snapshot::AgentSnapshot;
