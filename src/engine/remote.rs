/// Remote transport: fetching `{ group: [record, ...] }` payloads over HTTP.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;

use super::errors::SearchError;
use super::record::{GroupedRecords, groups_from_object};
use super::source::{HttpMethod, RemoteEndpoint};

/// Anything that can answer a remote search with grouped records.
#[async_trait]
pub trait RemoteFetch: Send + Sync {
    /// Query `endpoint` with `query` and return the grouped payload.
    ///
    /// # Errors
    ///
    /// Returns one of the `Remote*` variants of `SearchError`.
    async fn fetch(&self, endpoint: &RemoteEndpoint, query: &str)
    -> Result<GroupedRecords, SearchError>;
}

/// `RemoteFetch` over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Config` if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("typeahead/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SearchError::Config(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteFetch for HttpFetcher {
    async fn fetch(
        &self,
        endpoint: &RemoteEndpoint,
        query: &str,
    ) -> Result<GroupedRecords, SearchError> {
        let params = [("query", query)];
        let request = match endpoint.method {
            HttpMethod::Get => self.client.get(&endpoint.url).query(&params),
            method => self
                .client
                .request(to_reqwest_method(method), &endpoint.url)
                .form(&params),
        };

        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(&endpoint.url, &e))?;

        if let Some(err) = classify_status(&endpoint.url, response.status().as_u16()) {
            return Err(err);
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| payload_error(&endpoint.url, &e))?;
        groups_from_payload(&endpoint.url, payload)
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn transport_error(endpoint: &str, err: &reqwest::Error) -> SearchError {
    SearchError::RemoteUnclassified {
        endpoint: endpoint.to_owned(),
        status: err.status().map(|s| s.as_u16()),
        detail: err.to_string(),
    }
}

/// A body that arrived but does not decode as JSON is malformed; anything
/// else that breaks while reading it is a transport failure.
fn payload_error(endpoint: &str, err: &reqwest::Error) -> SearchError {
    if err.is_decode() {
        SearchError::RemoteMalformedPayload {
            endpoint: endpoint.to_owned(),
            status: None,
            detail: err.to_string(),
        }
    } else {
        transport_error(endpoint, err)
    }
}

/// Map a response status to a failure kind. Success statuses map to `None`.
///
/// 412 is how servers commonly signal that the source they produced is not
/// valid JSON.
#[must_use]
pub fn classify_status(endpoint: &str, status: u16) -> Option<SearchError> {
    let endpoint = endpoint.to_owned();
    match status {
        200..=299 => None,
        412 => Some(SearchError::RemoteMalformedPayload {
            endpoint,
            status: Some(412),
            detail: "server reported precondition failed (412)".to_owned(),
        }),
        404 => Some(SearchError::RemoteNotFound { endpoint }),
        500 => Some(SearchError::RemoteServerError { endpoint }),
        other => Some(SearchError::RemoteUnclassified {
            endpoint,
            status: Some(other),
            detail: format!("unexpected HTTP status {other}"),
        }),
    }
}

/// Turn a decoded payload into groups.
///
/// # Errors
///
/// Returns `SearchError::RemoteMalformedPayload` if the top level is not an
/// object.
pub fn groups_from_payload(
    endpoint: &str,
    payload: Value,
) -> Result<GroupedRecords, SearchError> {
    match payload {
        Value::Object(object) => Ok(groups_from_object(&object)),
        _ => Err(SearchError::RemoteMalformedPayload {
            endpoint: endpoint.to_owned(),
            status: None,
            detail: "expected an object mapping group names to records".to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    const URL: &str = "https://example.com/search";

    /// Answer one HTTP request on a local port with `status` and `body`.
    /// The task resolves to the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/s", listener.local_addr().unwrap());
        let task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            // The client may hang up as soon as it has the status line.
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            request
        });
        (url, task)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).into_owned();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn endpoint(url: String, method: HttpMethod) -> RemoteEndpoint {
        RemoteEndpoint { url, method }
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_success_statuses_pass() {
        assert!(classify_status(URL, 200).is_none());
        assert!(classify_status(URL, 204).is_none());
    }

    #[test]
    fn test_known_failure_statuses() {
        assert_eq!(classify_status(URL, 412).unwrap().code(), "remote_malformed_payload");
        assert_eq!(classify_status(URL, 404).unwrap().code(), "remote_not_found");
        assert_eq!(classify_status(URL, 500).unwrap().code(), "remote_server_error");
    }

    #[test]
    fn test_precondition_failed_carries_status() {
        match classify_status(URL, 412) {
            Some(SearchError::RemoteMalformedPayload { status, .. }) => {
                assert_eq!(status, Some(412));
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_other_statuses_are_unclassified() {
        match classify_status(URL, 503) {
            Some(SearchError::RemoteUnclassified { status, .. }) => assert_eq!(status, Some(503)),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_groups_from_payload() {
        let payload = json!({"Users": [{"name": "Ann"}], "Orders": []});
        let groups = groups_from_payload(URL, payload).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Users");
        assert_eq!(groups[0].records.len(), 1);
    }

    #[test]
    fn test_groups_from_payload_rejects_non_object() {
        let err = groups_from_payload(URL, json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.code(), "remote_malformed_payload");
    }

    #[tokio::test]
    async fn test_get_sends_query_as_url_param() {
        let (url, server) = serve_once("200 OK", r#"{"Fruit":[{"name":"apple"}]}"#).await;
        let groups = fetcher()
            .fetch(&endpoint(url, HttpMethod::Get), "a b")
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /s?query=a+b "), "{request}");
        assert!(request.to_lowercase().contains("accept: application/json"));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Fruit");
    }

    #[tokio::test]
    async fn test_post_sends_query_as_form_body() {
        let (url, server) = serve_once("200 OK", r#"{"Fruit":[]}"#).await;
        fetcher()
            .fetch(&endpoint(url, HttpMethod::Post), "a b&c")
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("POST /s "), "{request}");
        assert!(
            request
                .to_lowercase()
                .contains("content-type: application/x-www-form-urlencoded")
        );
        assert!(request.ends_with("\r\n\r\nquery=a+b%26c"), "{request}");
    }

    #[tokio::test]
    async fn test_failure_statuses_from_server() {
        for (status, code, expected) in [
            ("412 Precondition Failed", "remote_malformed_payload", Some(412)),
            ("404 Not Found", "remote_not_found", Some(404)),
            ("500 Internal Server Error", "remote_server_error", Some(500)),
            ("503 Service Unavailable", "remote_unclassified", Some(503)),
        ] {
            let (url, server) = serve_once(status, "{}").await;
            let err = fetcher()
                .fetch(&endpoint(url, HttpMethod::Get), "apple")
                .await
                .unwrap_err();
            server.await.unwrap();

            assert_eq!(err.code(), code);
            let detail = crate::types::ErrorDetail::from_search_error(&err);
            assert_eq!(detail.status, expected);
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_malformed() {
        let (url, server) = serve_once("200 OK", "{'Users': []}").await;
        let err = fetcher()
            .fetch(&endpoint(url, HttpMethod::Get), "apple")
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            SearchError::RemoteMalformedPayload { status, .. } => assert_eq!(status, None),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new(Duration::from_secs(1)).is_ok());
    }
}
