//! Where raw indexer collections come from.

use shibplay_history::{process_bets, ProcessingConfig};
use shibplay_types::{BetRecord, HistoryError, RawEvents, Report};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("snapshot is not structured as expected: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<&SourceError> for HistoryError {
    fn from(err: &SourceError) -> Self {
        match err {
            SourceError::Io { .. } => HistoryError::network(err.to_string()),
            SourceError::Malformed(_) => HistoryError::parsing(err.to_string()),
        }
    }
}

/// Provider of raw indexer collections for one user.
pub trait EventSource {
    fn fetch(&self, user_address: &str) -> Result<RawEvents, SourceError>;
}

/// A raw snapshot saved as JSON, e.g. a dump of the indexer query result.
///
/// The snapshot may hold any number of users; filtering happens during
/// processing.
#[derive(Clone, Debug)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for SnapshotSource {
    fn fetch(&self, user_address: &str) -> Result<RawEvents, SourceError> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let events: RawEvents = serde_json::from_str(&json)?;
        debug!(
            path = %self.path.display(),
            user = user_address,
            bets = events.total_bets(),
            claims = events.claims.len(),
            "loaded snapshot"
        );
        Ok(events)
    }
}

/// Fetch and process history for `user_address`.
///
/// A source failure yields [`Report::Failed`] instead of an error.
pub fn load_history(
    source: &impl EventSource,
    user_address: &str,
    config: &ProcessingConfig,
) -> Report<Vec<BetRecord>> {
    match source.fetch(user_address) {
        Ok(events) => process_bets(&events, user_address, config),
        Err(err) => {
            warn!(%err, "failed to load raw events");
            Report::Failed(HistoryError::from(&err))
        }
    }
}
