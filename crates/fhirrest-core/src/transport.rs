//! Single request/response exchanges with the FHIR server.

use std::borrow::Cow;
use std::collections::BTreeMap;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::document::{RecordDocument, parse_object};
use crate::error::{ReconcileError, Result};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Connection settings shared by every operation of an engine.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    base_url: String,
    default_headers: BTreeMap<String, String>,
    client: reqwest::Client,
}

impl TransportConfig {
    pub fn new(
        base_url: impl Into<String>,
        default_headers: BTreeMap<String, String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers,
            client,
        }
    }

    /// Builds the transport settings from a validated provider configuration.
    pub fn from_provider(config: &ProviderConfig, client: reqwest::Client) -> Self {
        Self::new(
            config.fhir_base_url.clone(),
            config.default_headers.clone(),
            client,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.default_headers
    }
}

/// Picks the per-call override when present and non-empty, else the default.
pub fn resolve_base_url<'a>(override_url: Option<&'a str>, default: &'a str) -> &'a str {
    match override_url {
        Some(url) if !url.is_empty() => url,
        _ => default,
    }
}

/// Appends `path` to `base` as `{base}/{path}`.
///
/// Trailing slashes on `base` are stripped first, so `http://h/fhir/` and
/// `http://h/fhir` both yield `http://h/fhir/{path}` rather than a `//`
/// segment. `path` is appended verbatim.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// Raw status and body of a server response.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl RemoteResponse {
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Status line text, e.g. `404 Not Found`.
    pub fn status_text(&self) -> String {
        self.status.to_string()
    }

    /// A status whose first digit is `2`.
    pub fn is_success(&self) -> bool {
        self.status.as_str().starts_with('2')
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Parses the body as a JSON object. `url` names the source in errors.
    pub fn parsed_body(&self, url: &str) -> Result<RecordDocument> {
        let fields = parse_object(&self.body).map_err(|reason| ReconcileError::ResponseParse {
            url: url.to_string(),
            reason,
        })?;
        Ok(RecordDocument::from_map(fields, url))
    }
}

/// Executes HTTP requests with the configured default headers.
///
/// Never retries and imposes no timeout beyond the client's own.
#[derive(Debug, Clone)]
pub struct RemoteTransport {
    config: TransportConfig,
}

impl RemoteTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Sends one request and reads the full response body.
    ///
    /// `headers` are applied over the default headers; `Content-Type` is
    /// always `application/json` regardless of either.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        headers: &BTreeMap<String, String>,
    ) -> Result<RemoteResponse> {
        let header_map = merge_headers(&self.config.default_headers, headers).map_err(|reason| {
            ReconcileError::Transport {
                url: url.to_string(),
                reason,
            }
        })?;

        debug!(%method, url, "sending request");
        let mut request = self
            .config
            .client
            .request(method.clone(), url)
            .headers(header_map);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ReconcileError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ReconcileError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        debug!(%method, url, %status, len = bytes.len(), "received response");

        Ok(RemoteResponse::new(status, bytes.to_vec()))
    }
}

fn merge_headers(
    defaults: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> std::result::Result<HeaderMap, String> {
    let mut map = HeaderMap::new();
    for (key, value) in defaults.iter().chain(overrides) {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| format!("invalid header name {key}: {e}"))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| format!("invalid value for header {key}: {e}"))?;
        map.insert(name, value);
    }
    map.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_base_url() {
        assert_eq!(resolve_base_url(None, "http://a"), "http://a");
        assert_eq!(resolve_base_url(Some(""), "http://a"), "http://a");
        assert_eq!(resolve_base_url(Some("http://b"), "http://a"), "http://b");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h/fhir", "Patient"), "http://h/fhir/Patient");
        assert_eq!(join_url("http://h/fhir/", "Patient/1"), "http://h/fhir/Patient/1");
        assert_eq!(join_url("http://h/fhir//", "Patient/1"), "http://h/fhir/Patient/1");
        assert_eq!(join_url("http://h/fhir", "Binary/a/b"), "http://h/fhir/Binary/a/b");
    }

    #[test]
    fn test_merge_headers_forces_content_type() {
        let defaults = headers(&[("Authorization", "Bearer a"), ("content-type", "text/plain")]);
        let overrides = headers(&[("Authorization", "Bearer b"), ("Content-Type", "text/xml")]);
        let map = merge_headers(&defaults, &overrides).unwrap();
        assert_eq!(map.get("authorization").unwrap(), "Bearer b");
        assert_eq!(map.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(map.get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_merge_headers_rejects_invalid_name() {
        let err = merge_headers(&headers(&[("bad header", "x")]), &BTreeMap::new()).unwrap_err();
        assert!(err.contains("bad header"));
    }

    #[test]
    fn test_response_success_classification() {
        assert!(RemoteResponse::new(StatusCode::OK, vec![]).is_success());
        assert!(RemoteResponse::new(StatusCode::NO_CONTENT, vec![]).is_success());
        assert!(!RemoteResponse::new(StatusCode::NOT_MODIFIED, vec![]).is_success());
        assert!(!RemoteResponse::new(StatusCode::NOT_FOUND, vec![]).is_success());
    }

    #[test]
    fn test_parsed_body() {
        let response = RemoteResponse::new(StatusCode::OK, br#"{"id":"1"}"#.to_vec());
        let doc = response.parsed_body("http://h/Patient").unwrap();
        assert_eq!(doc.get_string("id").unwrap(), "1");

        let empty = RemoteResponse::new(StatusCode::OK, Vec::new());
        assert!(matches!(
            empty.parsed_body("http://h/Patient"),
            Err(ReconcileError::ResponseParse { .. })
        ));
    }
}
