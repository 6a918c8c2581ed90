//! Typed endpoint groups of the admin API.
//!
//! Every group is a thin view over an [`ApiClient`]; all calls go through
//! [`ApiClient::execute`] and inherit its retry and authentication behavior.

mod admin;
mod analytics;
mod emergencies;
mod settings;
mod users;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::http::{ApiClient, RequestDescriptor, RequestError};

pub use admin::{AdminApi, PasswordChange};
pub use analytics::{AnalyticsApi, DateRange, ExportParams, GeoScope};
pub use emergencies::{EmergenciesApi, ListEmergenciesParams};
pub use settings::SettingsApi;
pub use users::{ListUsersParams, LocationHistoryParams, UserAlertsParams, UsersApi};

/// Sort direction for paginated listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Emergency alert status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
    All,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertStatus::Active => write!(f, "active"),
            AlertStatus::Resolved => write!(f, "resolved"),
            AlertStatus::All => write!(f, "all"),
        }
    }
}

impl FromStr for AlertStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AlertStatus::Active),
            "resolved" => Ok(AlertStatus::Resolved),
            "all" => Ok(AlertStatus::All),
            _ => anyhow::bail!(
                "Unknown alert status: {}. Expected active, resolved, or all.",
                s
            ),
        }
    }
}

impl ApiClient {
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn emergencies(&self) -> EmergenciesApi<'_> {
        EmergenciesApi::new(self)
    }

    pub fn analytics(&self) -> AnalyticsApi<'_> {
        AnalyticsApi::new(self)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }

    pub fn settings(&self) -> SettingsApi<'_> {
        SettingsApi::new(self)
    }
}

/// Attach the fields of `params` as query parameters; `None` fields are dropped.
fn with_query<T: Serialize>(
    descriptor: RequestDescriptor,
    params: &T,
) -> Result<RequestDescriptor, RequestError> {
    let value = serde_json::to_value(params).map_err(|e| {
        RequestError::InvalidRequest(format!("failed to encode query parameters: {}", e))
    })?;
    Ok(descriptor.params(&value))
}

/// Resource identifiers are interpolated into paths and must stay one segment.
fn resource_id(id: &str) -> Result<&str, RequestError> {
    if id.is_empty()
        || id
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
    {
        return Err(RequestError::InvalidRequest(format!(
            "invalid resource id: {:?}",
            id
        )));
    }
    Ok(id)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::auth::StaticTokenProvider;
    use crate::config::{ClientConfig, ConfigStore};
    use crate::http::{ApiClient, HttpMethod, TransportResponse};
    use crate::http::{OutboundRequest, Transport};
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::Value;

    /// Asserts exactly one request with the given shape and answers `reply`.
    pub struct ExpectOne {
        pub method: HttpMethod,
        pub url: String,
        pub body: Option<Value>,
        pub reply: String,
    }

    #[async_trait]
    impl Transport for ExpectOne {
        async fn send(&self, request: OutboundRequest) -> Result<TransportResponse> {
            assert_eq!(request.method, self.method);
            assert_eq!(request.url, self.url);
            let body = request
                .body
                .as_deref()
                .map(|b| serde_json::from_str::<Value>(b).unwrap());
            assert_eq!(body, self.body);
            Ok(TransportResponse::new(200, self.reply.clone()))
        }
    }

    pub fn client_expecting(
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> ApiClient {
        let config = ClientConfig {
            base_url: "https://api.example.com/v1".to_string(),
            ..ClientConfig::default()
        };
        ApiClient::new(
            ConfigStore::new(config),
            Arc::new(ExpectOne {
                method,
                url: format!("https://api.example.com/v1{}", path),
                body,
                reply: r#"{"ok": true}"#.to_string(),
            }),
            Arc::new(StaticTokenProvider::new(Some("token".into()))),
        )
    }
}
