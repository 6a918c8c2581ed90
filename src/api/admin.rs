//! Admin account endpoints.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::http::{ApiClient, ApiResponse, RequestDescriptor, RequestError};

/// Body of `POST /admin/change-password`.
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChange").finish_non_exhaustive()
    }
}

pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> Result<ApiResponse, RequestError> {
        self.client
            .execute(RequestDescriptor::get("/admin/profile"))
            .await
    }

    pub async fn update_profile(&self, profile: Value) -> Result<ApiResponse, RequestError> {
        self.client
            .execute(RequestDescriptor::patch("/admin/profile").body(profile))
            .await
    }

    pub async fn change_password(
        &self,
        change: &PasswordChange,
    ) -> Result<ApiResponse, RequestError> {
        let body = serde_json::to_value(change).map_err(|e| {
            RequestError::InvalidRequest(format!("failed to encode password change: {}", e))
        })?;
        self.client
            .execute(RequestDescriptor::post("/admin/change-password").body(body))
            .await
    }

    pub async fn create_admin(&self, admin: Value) -> Result<ApiResponse, RequestError> {
        self.client
            .execute(RequestDescriptor::post("/admin/users").body(admin))
            .await
    }

    pub async fn list_admins(&self) -> Result<ApiResponse, RequestError> {
        self.client
            .execute(RequestDescriptor::get("/admin/users"))
            .await
    }
}
