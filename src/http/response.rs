//! Raw transport responses and the decoded envelope returned to callers.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

use super::error::RequestError;

/// What a transport hands back for one attempt, before any interpretation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    /// Header names are lowercase.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Response with the canonical reason phrase for `status`.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Error body as JSON, or an empty object when it cannot be parsed.
    pub fn error_body(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|_| Value::Object(Default::default()))
    }

    /// Interpret a non-2xx response as a pipeline failure.
    pub fn into_error(self) -> RequestError {
        let body = self.error_body();
        RequestError::Http {
            status: self.status,
            status_text: self.status_text,
            body,
        }
    }
}

/// Decoded result of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub data: Value,
    pub status: u16,
    /// Header names are lowercase.
    pub headers: BTreeMap<String, String>,
}

impl ApiResponse {
    /// Decode a 2xx transport response. An empty body decodes to `null`.
    pub fn from_transport(response: TransportResponse) -> Result<Self, RequestError> {
        let data = if response.body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&response.body)
                .map_err(|e| RequestError::Decode(e.to_string()))?
        };

        Ok(Self {
            data,
            status: response.status,
            headers: response.headers,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Deserialize the response data into a typed value.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(self.data).context("Failed to parse response data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_fills_reason() {
        let response = TransportResponse::new(404, "");
        assert_eq!(response.status_text, "Not Found");
        assert!(!response.is_success());
        assert!(TransportResponse::new(204, "").is_success());
    }

    #[test]
    fn test_error_body_unparseable_is_empty_object() {
        let response = TransportResponse::new(502, "<html>Bad Gateway</html>");
        assert_eq!(response.error_body(), json!({}));
    }

    #[test]
    fn test_into_error() {
        let err = TransportResponse::new(500, r#"{"error":"db down"}"#).into_error();
        match err {
            RequestError::Http { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body["error"], "db down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_transport() {
        let response = TransportResponse::new(200, r#"{"users": [], "total": 0}"#)
            .with_header("X-Request-Id", "abc");
        let envelope = ApiResponse::from_transport(response).unwrap();
        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.data["total"], 0);
        assert_eq!(envelope.header("x-request-id"), Some("abc"));
        assert_eq!(envelope.header("X-Request-Id"), Some("abc"));
    }

    #[test]
    fn test_from_transport_empty_body() {
        let envelope = ApiResponse::from_transport(TransportResponse::new(204, "")).unwrap();
        assert_eq!(envelope.data, Value::Null);
    }

    #[test]
    fn test_from_transport_invalid_json() {
        let err = ApiResponse::from_transport(TransportResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[test]
    fn test_into_data() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Page {
            total: u32,
        }

        let envelope = ApiResponse::from_transport(TransportResponse::new(200, r#"{"total": 7}"#)).unwrap();
        let page: Page = envelope.into_data().unwrap();
        assert_eq!(page, Page { total: 7 });
    }
}
