/// Source adapter: local in-memory groups or a remote JSON endpoint.
///
/// The variant is chosen once when the source is built and never re-derived
/// at search time.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::SearchError;
use super::record::{
    Group, GroupedRecords, MatchEntry, SearchOutcome, groups_from_object, records_from_value,
};
use super::remote::RemoteFetch;
use super::report::Reporter;
use super::walker::walk_into;

/// HTTP method used for remote searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    /// `query` is sent as a URL parameter.
    Get,
    /// `query` is sent as a form body field.
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Upper-case method name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported HTTP method '{other}'")),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_owned()
    }
}

/// A remote search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    /// URL queried with the current text.
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
}

/// Where records come from.
#[derive(Debug, Clone)]
pub enum Source {
    /// In-memory named groups, searched synchronously.
    Local(Arc<GroupedRecords>),
    /// HTTP endpoint returning `{ group: [record, ...] }`, searched after a debounce.
    Remote(RemoteEndpoint),
}

impl Source {
    /// Build a source from a configuration value.
    ///
    /// A string is a remote URL, an object maps group names to record lists, and
    /// an array holds record lists whose groups are named by index.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidSource` for any other JSON kind or a blank URL.
    pub fn from_value(value: &Value, method: HttpMethod) -> Result<Self, SearchError> {
        match value {
            Value::String(url) if url.trim().is_empty() => Err(SearchError::InvalidSource {
                reason: "remote URL is empty".to_owned(),
            }),
            Value::String(url) => Ok(Self::Remote(RemoteEndpoint {
                url: url.trim().to_owned(),
                method,
            })),
            Value::Object(object) => Ok(Self::Local(Arc::new(groups_from_object(object)))),
            Value::Array(items) => Ok(Self::Local(Arc::new(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| Group {
                        name: index.to_string(),
                        records: records_from_value(item),
                    })
                    .collect(),
            ))),
            other => Err(SearchError::InvalidSource {
                reason: format!("expected a URL or a collection of groups, got {}", kind_name(other)),
            }),
        }
    }

    /// Whether searches go over the network (and are therefore debounced).
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Search local groups synchronously.
///
/// Empty groups are skipped. A source with zero groups is reported as a
/// configuration warning and yields an empty outcome.
#[must_use]
pub fn search_local(
    groups: &Arc<GroupedRecords>,
    query: &str,
    case_sensitive: bool,
    reporter: &Reporter,
) -> SearchOutcome {
    if groups.is_empty() {
        reporter.report(&SearchError::EmptySource);
    }
    SearchOutcome {
        query: query.to_owned(),
        matches: match_groups(groups, query, case_sensitive),
        groups: Arc::clone(groups),
    }
}

/// Fetch groups from a remote endpoint and match them exactly like local groups.
///
/// # Errors
///
/// Returns the classified remote failure; no retry is attempted.
pub async fn search_remote(
    fetcher: &dyn RemoteFetch,
    endpoint: &RemoteEndpoint,
    query: &str,
    case_sensitive: bool,
) -> Result<SearchOutcome, SearchError> {
    let groups = fetcher.fetch(endpoint, query).await?;
    Ok(SearchOutcome {
        query: query.to_owned(),
        matches: match_groups(&groups, query, case_sensitive),
        groups: Arc::new(groups),
    })
}

fn match_groups(groups: &[Group], query: &str, case_sensitive: bool) -> Vec<MatchEntry> {
    let mut matches = Vec::new();
    for group in groups.iter().filter(|g| !g.records.is_empty()) {
        walk_into(&group.records, &group.name, query, case_sensitive, &mut matches);
    }
    matches
}
