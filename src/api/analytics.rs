//! Dashboard analytics endpoints.

use serde::Serialize;

use super::with_query;
use crate::http::{ApiClient, ApiResponse, RequestDescriptor, RequestError};

/// Inclusive date range, dates as `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// What the geographical distribution covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoScope {
    Users,
    Emergencies,
    Both,
}

/// Query for `GET /analytics/export`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportParams {
    /// users, emergencies or all
    #[serde(rename = "type")]
    pub data_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// csv, pdf or excel
    pub format: Option<String>,
}

#[derive(Serialize)]
struct MonthsParams {
    months: Option<u32>,
}

#[derive(Serialize)]
struct GeoParams {
    #[serde(rename = "type")]
    scope: Option<GeoScope>,
}

pub struct AnalyticsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AnalyticsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn daily_emergencies(&self, range: &DateRange) -> Result<ApiResponse, RequestError> {
        let descriptor = with_query(RequestDescriptor::get("/analytics/emergencies/daily"), range)?;
        self.client.execute(descriptor).await
    }

    /// User registrations per month, `months` back (server default 12).
    pub async fn monthly_registrations(
        &self,
        months: Option<u32>,
    ) -> Result<ApiResponse, RequestError> {
        let descriptor = with_query(
            RequestDescriptor::get("/analytics/users/monthly"),
            &MonthsParams { months },
        )?;
        self.client.execute(descriptor).await
    }

    pub async fn emergencies_by_type(
        &self,
        range: &DateRange,
    ) -> Result<ApiResponse, RequestError> {
        let descriptor = with_query(RequestDescriptor::get("/analytics/emergencies/types"), range)?;
        self.client.execute(descriptor).await
    }

    pub async fn geo_distribution(
        &self,
        scope: Option<GeoScope>,
    ) -> Result<ApiResponse, RequestError> {
        let descriptor = with_query(
            RequestDescriptor::get("/analytics/geo-distribution"),
            &GeoParams { scope },
        )?;
        self.client.execute(descriptor).await
    }

    /// Export analytics data; the server answers with JSON like every other call.
    pub async fn export(&self, params: &ExportParams) -> Result<ApiResponse, RequestError> {
        let descriptor = with_query(RequestDescriptor::get("/analytics/export"), params)?;
        self.client.execute(descriptor).await
    }
}
