/// Shared serializable output types for all commands.
///
/// These types are what gets written to stdout, either as JSON or rendered
/// as a table. They are decoupled from the engine's `MatchEntry` / `Group` types.
use serde::Serialize;

use crate::engine::{MatchEntry, Record, SearchError, SearchOutcome};
use crate::panel::render::display_value;

/// A matched record in flat representation.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutput {
    /// Top-level group the record was found in.
    pub group: String,
    /// Field whose value matched.
    pub field: String,
    /// Display value of the matched field.
    pub value: String,
    /// The full record.
    pub row: Record,
}

impl MatchOutput {
    /// Flatten a `MatchEntry`.
    #[must_use]
    pub fn from_entry(entry: &MatchEntry) -> Self {
        Self {
            group: entry.group.clone(),
            field: entry.field.clone(),
            value: display_value(entry.row.get(&entry.field)),
            row: entry.row.clone(),
        }
    }

    /// Flatten every match of an outcome, in order.
    #[must_use]
    pub fn from_outcome(outcome: &SearchOutcome) -> Vec<Self> {
        outcome.matches.iter().map(Self::from_entry).collect()
    }
}

/// A group of a local source.
#[derive(Debug, Clone, Serialize)]
pub struct GroupOutput {
    /// Group name.
    pub name: String,
    /// Number of records in the group.
    pub records: usize,
}

/// One line of `watch` output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchOutput {
    /// A result set was rendered.
    Rendered {
        /// Input instance (e.g., "typeahead-1").
        instance: String,
        /// Query the results belong to.
        query: String,
        /// The matches.
        matches: Vec<MatchOutput>,
    },
    /// The input became empty and results were hidden.
    Hidden {
        /// Input instance.
        instance: String,
    },
    /// A remote search failed; nothing was rendered.
    Failed {
        /// Input instance.
        instance: String,
        /// Query that was searched.
        query: String,
        /// Error details.
        error: ErrorDetail,
    },
}

/// A structured error envelope for JSON error output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
    /// Always `false`.
    pub ok: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail in the JSON error envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (snake_case).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Whether the error is a non-fatal notice.
    pub warning: bool,
    /// HTTP status of a failed remote search, when the server answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorDetail {
    /// Describe a `SearchError`.
    #[must_use]
    pub fn from_search_error(err: &SearchError) -> Self {
        let status = match err {
            SearchError::RemoteNotFound { .. } => Some(404),
            SearchError::RemoteServerError { .. } => Some(500),
            SearchError::RemoteMalformedPayload { status, .. }
            | SearchError::RemoteUnclassified { status, .. } => *status,
            _ => None,
        };
        Self {
            code: err.code().to_owned(),
            message: err.to_string(),
            warning: err.is_warning(),
            status,
        }
    }
}

impl ErrorOutput {
    /// Construct from a `SearchError`.
    #[must_use]
    pub fn from_search_error(err: &SearchError) -> Self {
        Self {
            ok: false,
            error: ErrorDetail::from_search_error(err),
        }
    }
}
