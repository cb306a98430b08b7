//! Soft-failure taxonomy shared by every pipeline stage.
//!
//! Hard failures (I/O, malformed configuration) use per-crate `thiserror`
//! enums. Everything that happens *inside* a batch (one bad record, one
//! invalid filter field) is reported as a [`HistoryError`] next to a
//! best-effort result through [`Report`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a soft failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Upstream fetch failed.
    Network,
    /// A single raw record could not be interpreted.
    Parsing,
    /// Filter, sort or statistics input was invalid and has been corrected.
    Validation,
    /// An aggregate computation failed.
    Calculation,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Validation => "validation",
            Self::Calculation => "calculation",
            Self::Unknown => "unknown",
        }
    }

    /// Whether repeating the operation can reasonably succeed.
    pub fn default_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Calculation)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal error surfaced alongside a (possibly partial) result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl HistoryError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: kind.default_retryable(),
            record_id: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn parsing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parsing, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn calculation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Calculation, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn with_record(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.record_id {
            Some(id) => write!(f, "{} error ({id}): {}", self.kind, self.message),
            None => write!(f, "{} error: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for HistoryError {}

/// A single field-level validation warning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl From<Violation> for HistoryError {
    fn from(violation: Violation) -> Self {
        HistoryError::validation(violation.to_string())
    }
}

/// Result of a batch operation that degrades instead of failing.
#[derive(Clone, Debug, PartialEq)]
pub enum Report<T> {
    /// Every input was processed cleanly.
    Complete(T),
    /// A usable result, but some inputs were skipped or corrected.
    Partial {
        data: T,
        warnings: Vec<HistoryError>,
    },
    /// The input could not be used at all.
    Failed(HistoryError),
}

impl<T> Report<T> {
    /// Build `Complete` or `Partial` depending on whether warnings exist.
    pub fn from_parts(data: T, warnings: Vec<HistoryError>) -> Self {
        if warnings.is_empty() {
            Self::Complete(data)
        } else {
            Self::Partial { data, warnings }
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Complete(data) | Self::Partial { data, .. } => Some(data),
            Self::Failed(_) => None,
        }
    }

    pub fn warnings(&self) -> &[HistoryError] {
        match self {
            Self::Partial { warnings, .. } => warnings,
            Self::Complete(_) | Self::Failed(_) => &[],
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Report<U> {
        match self {
            Self::Complete(data) => Report::Complete(f(data)),
            Self::Partial { data, warnings } => Report::Partial {
                data: f(data),
                warnings,
            },
            Self::Failed(err) => Report::Failed(err),
        }
    }

    /// Split into the data (or `fallback` on failure) and every error seen.
    pub fn into_parts_or(self, fallback: T) -> (T, Vec<HistoryError>) {
        match self {
            Self::Complete(data) => (data, Vec::new()),
            Self::Partial { data, warnings } => (data, warnings),
            Self::Failed(err) => (fallback, vec![err]),
        }
    }
}

impl<T: Default> Report<T> {
    pub fn into_parts(self) -> (T, Vec<HistoryError>) {
        self.into_parts_or(T::default())
    }
}
