//! Server-side settings endpoints.

use serde_json::Value;

use crate::http::{ApiClient, ApiResponse, RequestDescriptor, RequestError};

pub struct SettingsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SettingsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn app(&self) -> Result<ApiResponse, RequestError> {
        self.client
            .execute(RequestDescriptor::get("/settings/app"))
            .await
    }

    pub async fn update_app(&self, settings: Value) -> Result<ApiResponse, RequestError> {
        self.client
            .execute(RequestDescriptor::patch("/settings/app").body(settings))
            .await
    }

    pub async fn notifications(&self) -> Result<ApiResponse, RequestError> {
        self.client
            .execute(RequestDescriptor::get("/settings/notifications"))
            .await
    }

    pub async fn update_notifications(&self, settings: Value) -> Result<ApiResponse, RequestError> {
        self.client
            .execute(RequestDescriptor::patch("/settings/notifications").body(settings))
            .await
    }

    pub async fn api_credentials(&self) -> Result<ApiResponse, RequestError> {
        self.client
            .execute(RequestDescriptor::get("/settings/api-credentials"))
            .await
    }

    /// Issue a new key/secret pair; the old pair stops working.
    pub async fn regenerate_api_credentials(&self) -> Result<ApiResponse, RequestError> {
        self.client
            .execute(RequestDescriptor::post("/settings/api-credentials"))
            .await
    }
}
