/// Configuration surface: defaults, JSON config files and source loading.
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::engine::{HttpMethod, Reporter, SearchError, SearchOptions, Source};

/// Recognized options. Every field falls back to its default when absent;
/// unknown keys are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Emit notices for configuration warnings and failed searches.
    pub debug: bool,
    /// Remote URL string, or a collection of groups.
    pub source: Value,
    /// HTTP method for remote sources.
    pub method: HttpMethod,
    /// A query must be strictly longer than this to trigger a search.
    pub minimum_length: usize,
    /// Debounce window for remote sources, in milliseconds.
    pub search_delay: u64,
    /// Case-sensitive matching.
    pub case_sensitive: bool,
    /// Highlight the query inside rendered results.
    pub highlight_results: bool,
    /// Remote request timeout, in seconds.
    pub request_timeout: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            source: Value::Array(Vec::new()),
            method: HttpMethod::Post,
            minimum_length: 3,
            search_delay: 500,
            case_sensitive: false,
            highlight_results: true,
            request_timeout: 10,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Io` if the file cannot be read and
    /// `SearchError::Config` if it is not a valid settings object.
    pub fn from_file(path: &Path) -> Result<Self, SearchError> {
        let text = read_file(path)?;
        Self::from_json(&text).map_err(|e| match e {
            SearchError::Config(msg) => SearchError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse settings from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Config` on malformed JSON or mistyped options.
    pub fn from_json(text: &str) -> Result<Self, SearchError> {
        serde_json::from_str(text).map_err(|e| SearchError::Config(e.to_string()))
    }

    /// Scheduler options derived from these settings.
    #[must_use]
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            minimum_length: self.minimum_length,
            search_delay: Duration::from_millis(self.search_delay),
            case_sensitive: self.case_sensitive,
        }
    }

    /// Notice channel; silent in production mode.
    #[must_use]
    pub fn reporter(&self) -> Reporter {
        Reporter::new(self.debug)
    }

    /// Remote request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Build the configured source.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidSource` if the source is neither a URL nor
    /// a collection of groups.
    pub fn build_source(&self) -> Result<Source, SearchError> {
        Source::from_value(&self.source, self.method)
    }
}

/// Interpret a `--source` argument: an `http(s)://` URL is a remote source,
/// anything else is a path to a JSON data file holding the groups.
///
/// # Errors
///
/// Returns `SearchError::Io` if the file cannot be read and
/// `SearchError::InvalidSource` if it is not JSON.
pub fn load_source_arg(arg: &str) -> Result<Value, SearchError> {
    let trimmed = arg.trim();
    if is_url(trimmed) {
        return Ok(Value::String(trimmed.to_owned()));
    }
    let path = Path::new(trimmed);
    let text = read_file(path)?;
    serde_json::from_str(&text).map_err(|e| SearchError::InvalidSource {
        reason: format!("{} is not valid JSON: {e}", path.display()),
    })
}

fn is_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn read_file(path: &Path) -> Result<String, SearchError> {
    std::fs::read_to_string(path).map_err(|e| SearchError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.method, HttpMethod::Post);
        assert_eq!(s.minimum_length, 3);
        assert_eq!(s.search_options().search_delay, Duration::from_millis(500));
        assert!(!s.case_sensitive);
        assert!(s.highlight_results);
        assert!(matches!(s.build_source(), Ok(Source::Local(groups)) if groups.is_empty()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(
            r#"{"source": "https://example.com/q", "method": "get", "minimum_length": 1, "offset_left": 4}"#,
        )
        .unwrap();
        assert_eq!(s.method, HttpMethod::Get);
        assert_eq!(s.minimum_length, 1);
        assert_eq!(s.search_delay, 500);
        assert!(s.build_source().unwrap().is_remote());
    }

    #[test]
    fn test_bad_method_is_config_error() {
        let err = Settings::from_json(r#"{"method": "FETCH"}"#).unwrap_err();
        assert_eq!(err.code(), "invalid_config");
    }

    #[test]
    fn test_mistyped_option_is_config_error() {
        assert!(Settings::from_json(r#"{"minimum_length": "three"}"#).is_err());
    }

    #[test]
    fn test_source_arg_url() {
        let value = load_source_arg("HTTPS://example.com/search").unwrap();
        assert_eq!(value, Value::String("HTTPS://example.com/search".to_owned()));
    }

    #[test]
    fn test_source_arg_missing_file() {
        let err = load_source_arg("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.code(), "io_error");
    }

    #[test]
    fn test_source_arg_reads_file() {
        let path = std::env::temp_dir().join(format!("typeahead-source-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"Users": [{"name": "Ann"}]}"#).unwrap();
        let value = load_source_arg(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(value.get("Users").is_some());
    }
}
