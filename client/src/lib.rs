pub mod config;
pub mod source;

pub use config::{Config, ConfigError};
pub use source::{load_history, EventSource, SnapshotSource, SourceError};
