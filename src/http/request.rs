//! Request descriptors: everything that characterizes one API call.

use log::debug;
use reqwest::Url;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::RequestError;

/// HTTP methods the admin API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => anyhow::bail!(
                "Unsupported HTTP method: {}. Expected GET, POST, PUT, PATCH, or DELETE.",
                s
            ),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One API call. Unset `timeout`/`max_retries` fall back to the client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub endpoint: String,
    pub method: HttpMethod,
    pub body: Option<Value>,
    /// Query parameters in insertion order; `None` values are never sent.
    pub params: Vec<(String, Option<String>)>,
    pub use_auth: bool,
    pub timeout: Option<Duration>,
    pub max_retries: Option<u32>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            body: None,
            params: Vec::new(),
            use_auth: true,
            timeout: None,
            max_retries: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, endpoint)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), Some(value.to_string())));
        self
    }

    pub fn param_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.params
            .push((key.into(), value.map(|v| v.to_string())));
        self
    }

    /// Adds every entry of a JSON object as a query parameter.
    ///
    /// `null` entries are kept as absent values; strings are sent verbatim,
    /// numbers and booleans in their JSON spelling. Arrays and objects are
    /// skipped, as is any non-object `params`.
    pub fn params(mut self, params: &Value) -> Self {
        if let Value::Object(map) = params {
            for (key, value) in map {
                let value = match value {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
                    Value::Array(_) | Value::Object(_) => {
                        debug!("Skipping non-scalar query parameter {}", key);
                        continue;
                    }
                };
                self.params.push((key.clone(), value));
            }
        }
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.use_auth = false;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Target URL: base URL, endpoint (leading slash normalized) and the encoded
    /// query string of all present parameters.
    pub fn build_url(&self, base_url: &str) -> Result<Url, RequestError> {
        if self.endpoint.is_empty() {
            return Err(RequestError::InvalidRequest(
                "endpoint must not be empty".to_string(),
            ));
        }

        if has_dot_segment(&self.endpoint) {
            return Err(RequestError::InvalidRequest(format!(
                "endpoint must not contain '.' or '..' segments: {}",
                self.endpoint
            )));
        }

        let separator = if self.endpoint.starts_with('/') { "" } else { "/" };
        let raw = format!(
            "{}{}{}",
            base_url.trim_end_matches('/'),
            separator,
            self.endpoint
        );

        let mut url = Url::parse(&raw)
            .map_err(|e| RequestError::InvalidRequest(format!("invalid URL {}: {}", raw, e)))?;

        let present: Vec<(&str, &str)> = self
            .params
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key.as_str(), v)))
            .collect();
        if !present.is_empty() {
            url.query_pairs_mut().extend_pairs(present);
        }

        Ok(url)
    }

    /// JSON payload to send, if any. GET requests never carry a body.
    pub fn serialized_body(&self) -> Result<Option<String>, RequestError> {
        match (&self.method, &self.body) {
            (HttpMethod::Get, _) | (_, None) | (_, Some(Value::Null)) => Ok(None),
            (_, Some(body)) => serde_json::to_string(body).map(Some).map_err(|e| {
                RequestError::InvalidRequest(format!("failed to serialize request body: {}", e))
            }),
        }
    }
}

/// True when the path part of `endpoint` has a `.` or `..` segment, which URL
/// parsing would resolve against the base path.
fn has_dot_segment(endpoint: &str) -> bool {
    let path = endpoint.split(['?', '#']).next().unwrap_or_default();
    path.split('/').any(|segment| {
        let segment = segment.to_ascii_lowercase().replace("%2e", ".");
        segment == "." || segment == ".."
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://api.example.com/v1";

    #[test]
    fn test_build_url_drops_null_params() {
        let descriptor = RequestDescriptor::get("/users").params(&json!({
            "page": 1,
            "limit": 20,
            "search": null
        }));
        let url = descriptor.build_url(BASE).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users?page=1&limit=20");
    }

    #[test]
    fn test_build_url_normalizes_leading_slash() {
        let url = RequestDescriptor::get("users").build_url(BASE).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users");

        let url = RequestDescriptor::get("/users")
            .build_url("https://api.example.com/v1/")
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users");
    }

    #[test]
    fn test_build_url_empty_endpoint() {
        let err = RequestDescriptor::get("").build_url(BASE).unwrap_err();
        assert!(matches!(err, RequestError::InvalidRequest(_)));
    }

    #[test]
    fn test_build_url_invalid_base() {
        let err = RequestDescriptor::get("/users")
            .build_url("not a url")
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidRequest(_)));
    }

    #[test]
    fn test_build_url_encodes_values() {
        let url = RequestDescriptor::get("/users")
            .param("search", "jane doe&co")
            .build_url(BASE)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/users?search=jane+doe%26co"
        );
    }

    #[test]
    fn test_build_url_appends_to_existing_query() {
        let url = RequestDescriptor::get("/users?active=true")
            .param("page", 2)
            .build_url(BASE)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/users?active=true&page=2"
        );
    }

    #[test]
    fn test_build_url_only_null_params_has_no_query() {
        let url = RequestDescriptor::get("/users")
            .param_opt::<String>("search", None)
            .build_url(BASE)
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_params_scalars() {
        let descriptor = RequestDescriptor::get("/x").params(&json!({
            "flag": true,
            "ratio": 0.5,
            "name": "a"
        }));
        let url = descriptor.build_url(BASE).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("flag".into(), "true".into())));
        assert!(pairs.contains(&("ratio".into(), "0.5".into())));
        assert!(pairs.contains(&("name".into(), "a".into())));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_params_skips_arrays_and_objects() {
        let descriptor = RequestDescriptor::get("/x").params(&json!({
            "ids": ["a", "b"],
            "filter": {"status": "active"},
            "page": 1
        }));
        let url = descriptor.build_url(BASE).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/x?page=1");
    }

    #[test]
    fn test_build_url_rejects_dot_segments() {
        for endpoint in ["/../../x", "../x", "/users/./1", "/users/..", "/%2e%2E/x"] {
            let err = RequestDescriptor::get(endpoint).build_url(BASE).unwrap_err();
            assert!(
                matches!(err, RequestError::InvalidRequest(_)),
                "{} should be rejected",
                endpoint
            );
        }
    }

    #[test]
    fn test_build_url_allows_dots_inside_segments() {
        let url = RequestDescriptor::get("/files/report.v2..csv")
            .param("next", "../x")
            .build_url(BASE)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/files/report.v2..csv?next=..%2Fx"
        );
    }

    #[test]
    fn test_get_ignores_body() {
        let descriptor = RequestDescriptor::get("/users").body(json!({"a": 1}));
        assert_eq!(descriptor.serialized_body().unwrap(), None);
    }

    #[test]
    fn test_non_get_serializes_body() {
        for method in [
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ] {
            let descriptor = RequestDescriptor::new(method, "/users/1").body(json!({"name": "x"}));
            assert_eq!(
                descriptor.serialized_body().unwrap().as_deref(),
                Some(r#"{"name":"x"}"#)
            );
        }
    }

    #[test]
    fn test_post_without_body() {
        let descriptor = RequestDescriptor::post("/settings/api-credentials");
        assert_eq!(descriptor.serialized_body().unwrap(), None);
    }

    #[test]
    fn test_defaults() {
        let descriptor = RequestDescriptor::get("/users");
        assert_eq!(descriptor.method, HttpMethod::Get);
        assert!(descriptor.use_auth);
        assert!(descriptor.timeout.is_none());
        assert!(descriptor.max_retries.is_none());
        assert!(!descriptor.without_auth().use_auth);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("HEAD".parse::<HttpMethod>().is_err());
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
