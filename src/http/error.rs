//! Failure taxonomy of the request pipeline.

use serde_json::Value;
use std::time::Duration;

/// Terminal failure of one `execute` call.
#[derive(Debug)]
pub enum RequestError {
    /// No authenticated session, or the identity provider failed. Never retried.
    Authentication(String),
    /// The server answered with a non-2xx status.
    Http {
        status: u16,
        status_text: String,
        /// Decoded error body; an empty object when the body was not JSON.
        body: Value,
    },
    /// An attempt did not settle within its timeout.
    Timeout(Duration),
    /// Transport-level failure (DNS, refused or reset connection, ...).
    Network(anyhow::Error),
    /// The caller cancelled the request.
    Cancelled,
    /// The descriptor could not be turned into a request.
    InvalidRequest(String),
    /// A successful response carried a body that is not JSON.
    Decode(String),
}

impl RequestError {
    /// Whether the backoff policy applies to this failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, RequestError::Timeout(_) | RequestError::Network(_))
    }

    /// 401 or 403 from the server.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, RequestError::Http { status: 401 | 403, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short message suitable for showing to an operator.
    ///
    /// For HTTP failures this prefers the server's `message` or `error` field.
    pub fn user_message(&self) -> String {
        match self {
            RequestError::Http {
                status,
                status_text,
                body,
            } => {
                let detail = ["message", "error"]
                    .iter()
                    .find_map(|key| body.get(key).and_then(Value::as_str));
                match detail {
                    Some(detail) => format!("{} ({})", detail, status),
                    None if status_text.is_empty() => format!("Request failed with status {}", status),
                    None => format!("{} ({})", status_text, status),
                }
            }
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            RequestError::Http {
                status,
                status_text,
                ..
            } => write!(f, "HTTP {} {}", status, status_text),
            RequestError::Timeout(timeout) => {
                write!(f, "Request timeout after {}ms", timeout.as_millis())
            }
            RequestError::Network(err) => write!(f, "Network error: {:#}", err),
            RequestError::Cancelled => write!(f, "Request cancelled"),
            RequestError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            RequestError::Decode(msg) => write!(f, "Failed to decode response: {}", msg),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::Network(err) => Some(&**err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http(status: u16, body: Value) -> RequestError {
        RequestError::Http {
            status,
            status_text: "Internal Server Error".into(),
            body,
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            RequestError::Timeout(Duration::from_millis(30_000)).to_string(),
            "Request timeout after 30000ms"
        );
        assert!(
            RequestError::Authentication("User not authenticated".into())
                .to_string()
                .contains("User not authenticated")
        );
        assert_eq!(
            http(500, json!({})).to_string(),
            "HTTP 500 Internal Server Error"
        );
        assert!(
            RequestError::Network(anyhow::anyhow!("connection reset"))
                .to_string()
                .contains("connection reset")
        );
    }

    #[test]
    fn test_classification() {
        assert!(RequestError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(RequestError::Network(anyhow::anyhow!("dns")).is_transient());
        assert!(!http(500, json!({})).is_transient());
        assert!(!RequestError::Cancelled.is_transient());

        assert!(http(401, json!({})).is_auth_rejection());
        assert!(http(403, json!({})).is_auth_rejection());
        assert!(!http(404, json!({})).is_auth_rejection());
    }

    #[test]
    fn test_status() {
        assert_eq!(http(500, json!({})).status(), Some(500));
        assert_eq!(RequestError::Cancelled.status(), None);
    }

    #[test]
    fn test_user_message_prefers_body() {
        assert_eq!(
            http(500, json!({"error": "db down"})).user_message(),
            "db down (500)"
        );
        assert_eq!(
            http(400, json!({"message": "bad page", "error": "x"})).user_message(),
            "bad page (400)"
        );
        assert_eq!(
            http(500, json!({})).user_message(),
            "Internal Server Error (500)"
        );
    }

    #[test]
    fn test_network_source() {
        use std::error::Error;
        let err = RequestError::Network(anyhow::anyhow!("reset"));
        assert!(err.source().is_some());
        assert!(RequestError::Cancelled.source().is_none());
    }
}
