/// Errors from the search engine layer.
use thiserror::Error;

/// Errors that can occur while configuring a source or running a search.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// A local source was configured but holds no groups. Non-fatal.
    #[error("Source was set to a local collection, but the collection was empty")]
    EmptySource,

    /// The configured source is neither a URL string nor a collection of groups.
    #[error("Invalid source: {reason}")]
    InvalidSource {
        /// What was wrong with the source value.
        reason: String,
    },

    /// The remote endpoint answered with something that is not the expected JSON payload.
    #[error("Remote source '{endpoint}' is not valid JSON: {detail}")]
    RemoteMalformedPayload {
        /// Endpoint that was queried.
        endpoint: String,
        /// HTTP status when the server itself flagged the payload (412).
        status: Option<u16>,
        /// Parser or status detail.
        detail: String,
    },

    /// The remote endpoint does not exist on the server.
    #[error("Remote source '{endpoint}' does not exist on this server")]
    RemoteNotFound {
        /// Endpoint that was queried.
        endpoint: String,
    },

    /// The remote server failed while processing the search.
    #[error("Remote server encountered an error whilst processing '{endpoint}'")]
    RemoteServerError {
        /// Endpoint that was queried.
        endpoint: String,
    },

    /// Any other remote failure: unexpected status or transport error.
    #[error("Remote search against '{endpoint}' failed: {detail}")]
    RemoteUnclassified {
        /// Endpoint that was queried.
        endpoint: String,
        /// HTTP status, when the server answered at all.
        status: Option<u16>,
        /// Human-readable detail.
        detail: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A configuration or data file could not be read.
    #[error("Failed to read '{path}': {message}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },
}

impl SearchError {
    /// Stable machine-readable code (`snake_case`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptySource => "empty_source",
            Self::InvalidSource { .. } => "invalid_source",
            Self::RemoteMalformedPayload { .. } => "remote_malformed_payload",
            Self::RemoteNotFound { .. } => "remote_not_found",
            Self::RemoteServerError { .. } => "remote_server_error",
            Self::RemoteUnclassified { .. } => "remote_unclassified",
            Self::Config(_) => "invalid_config",
            Self::Io { .. } => "io_error",
        }
    }

    /// Whether the error only fails a single search attempt.
    ///
    /// Warnings are reported and the search fails closed; everything else
    /// aborts the command.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::EmptySource
                | Self::RemoteMalformedPayload { .. }
                | Self::RemoteNotFound { .. }
                | Self::RemoteServerError { .. }
                | Self::RemoteUnclassified { .. }
        )
    }

    /// Return the CLI exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidSource { .. } | Self::Config(_) => 2,
            Self::Io { .. } => 3,
            Self::RemoteMalformedPayload { .. }
            | Self::RemoteNotFound { .. }
            | Self::RemoteServerError { .. }
            | Self::RemoteUnclassified { .. } => 4,
            Self::EmptySource => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failures_are_warnings() {
        let err = SearchError::RemoteNotFound {
            endpoint: "/search".to_owned(),
        };
        assert!(err.is_warning());
        assert_eq!(err.code(), "remote_not_found");
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_config_errors_are_fatal() {
        let err = SearchError::InvalidSource {
            reason: "a number".to_owned(),
        };
        assert!(!err.is_warning());
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Invalid source: a number");
    }
}
