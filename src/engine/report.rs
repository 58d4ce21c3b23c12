/// Advisory reporting of non-fatal search failures.
use super::errors::SearchError;

/// Emits notices for configuration warnings and failed remote searches.
///
/// In production mode (`enabled == false`) every notice is suppressed.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    enabled: bool,
}

impl Reporter {
    /// Construct a reporter; `enabled` corresponds to the `debug` setting.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Report a failure. Returns `true` if a notice was emitted.
    pub fn report(&self, err: &SearchError) -> bool {
        if !self.enabled {
            return false;
        }
        tracing::warn!(code = err.code(), "{err}");
        true
    }
}
