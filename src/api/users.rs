//! User management endpoints.

use serde::Serialize;
use serde_json::Value;

use super::{AlertStatus, SortOrder, resource_id, with_query};
use crate::http::{ApiClient, ApiResponse, RequestDescriptor, RequestError};

/// Query for `GET /users`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub search: Option<String>,
}

/// Query for a user's location history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationHistoryParams {
    pub limit: Option<u32>,
    /// Days to look back.
    pub days: Option<u32>,
}

/// Query for a user's emergency alerts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserAlertsParams {
    pub limit: Option<u32>,
    pub status: Option<AlertStatus>,
}

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self, params: &ListUsersParams) -> Result<ApiResponse, RequestError> {
        let descriptor = with_query(RequestDescriptor::get("/users"), params)?;
        self.client.execute(descriptor).await
    }

    pub async fn get(&self, user_id: &str) -> Result<ApiResponse, RequestError> {
        let path = format!("/users/{}", resource_id(user_id)?);
        self.client.execute(RequestDescriptor::get(path)).await
    }

    pub async fn update(&self, user_id: &str, data: Value) -> Result<ApiResponse, RequestError> {
        let path = format!("/users/{}", resource_id(user_id)?);
        self.client
            .execute(RequestDescriptor::patch(path).body(data))
            .await
    }

    pub async fn delete(&self, user_id: &str) -> Result<ApiResponse, RequestError> {
        let path = format!("/users/{}", resource_id(user_id)?);
        self.client.execute(RequestDescriptor::delete(path)).await
    }

    pub async fn location_history(
        &self,
        user_id: &str,
        params: &LocationHistoryParams,
    ) -> Result<ApiResponse, RequestError> {
        let path = format!("/users/{}/locations", resource_id(user_id)?);
        let descriptor = with_query(RequestDescriptor::get(path), params)?;
        self.client.execute(descriptor).await
    }

    pub async fn emergency_alerts(
        &self,
        user_id: &str,
        params: &UserAlertsParams,
    ) -> Result<ApiResponse, RequestError> {
        let path = format!("/users/{}/emergencies", resource_id(user_id)?);
        let descriptor = with_query(RequestDescriptor::get(path), params)?;
        self.client.execute(descriptor).await
    }
}
