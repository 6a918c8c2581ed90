//! Emergency alert endpoints.

use serde::Serialize;
use serde_json::{Value, json};

use super::{AlertStatus, SortOrder, resource_id, with_query};
use crate::http::{ApiClient, ApiResponse, RequestDescriptor, RequestError};

/// Query for `GET /emergencies`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEmergenciesParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<AlertStatus>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

pub struct EmergenciesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> EmergenciesApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self, params: &ListEmergenciesParams) -> Result<ApiResponse, RequestError> {
        let descriptor = with_query(RequestDescriptor::get("/emergencies"), params)?;
        self.client.execute(descriptor).await
    }

    pub async fn get(&self, alert_id: &str) -> Result<ApiResponse, RequestError> {
        let path = format!("/emergencies/{}", resource_id(alert_id)?);
        self.client.execute(RequestDescriptor::get(path)).await
    }

    pub async fn update(&self, alert_id: &str, data: Value) -> Result<ApiResponse, RequestError> {
        let path = format!("/emergencies/{}", resource_id(alert_id)?);
        self.client
            .execute(RequestDescriptor::patch(path).body(data))
            .await
    }

    /// Mark an alert as resolved.
    pub async fn resolve(&self, alert_id: &str) -> Result<ApiResponse, RequestError> {
        self.update(alert_id, json!({ "status": AlertStatus::Resolved }))
            .await
    }
}
