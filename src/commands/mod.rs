//! Command implementations behind the `safewatch` binary.

use anyhow::{Context, Result, anyhow};
use clap::Args;
use log::debug;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{AlertStatus, ListEmergenciesParams, ListUsersParams, SortOrder};
use crate::auth::StaticTokenProvider;
use crate::config::{ClientConfig, Environment};
use crate::http::{ApiClient, HttpMethod, RequestDescriptor, RequestError};

/// Connection settings shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionOptions {
    /// Target deployment; selects the default API base URL
    #[arg(
        long,
        short = 'e',
        env = "SAFEWATCH_ENV",
        value_name = "ENV",
        global = true
    )]
    pub environment: Option<Environment>,

    /// API base URL (overrides the environment default)
    #[arg(long = "base-url", env = "SAFEWATCH_BASE_URL", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// API version path segment, e.g. v2
    #[arg(long = "api-version", value_name = "VERSION", global = true)]
    pub api_version: Option<String>,

    /// Value of the X-API-Key header
    #[arg(long = "api-key", env = "SAFEWATCH_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// API secret
    #[arg(
        long = "api-secret",
        env = "SAFEWATCH_API_SECRET",
        hide_env_values = true,
        global = true
    )]
    pub api_secret: Option<String>,

    /// Bearer token of the admin session
    #[arg(long, env = "SAFEWATCH_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Per-attempt timeout in milliseconds
    #[arg(long = "timeout-ms", value_name = "MS", global = true)]
    pub timeout_ms: Option<u64>,

    /// Retries after the first attempt
    #[arg(long, value_name = "N", global = true)]
    pub retries: Option<u32>,
}

impl ConnectionOptions {
    /// Client configuration described by these options.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::for_environment(self.environment.unwrap_or_default());
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(version) = &self.api_version {
            config = config.with_api_version(version);
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = api_key.clone();
        }
        if let Some(api_secret) = &self.api_secret {
            config.api_secret = api_secret.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(retries) = self.retries {
            config.max_retries = retries;
        }
        config
    }

    pub fn build_client(&self) -> Result<ApiClient> {
        let config = self.client_config();
        debug!("Using {:?}", config);
        let tokens = Arc::new(StaticTokenProvider::new(self.token.clone()));
        ApiClient::with_default_transport(config, tokens)
    }
}

/// Parses a `key=value` query parameter.
pub fn parse_param(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid parameter '{}'. Expected key=value.", s))?;
    if key.is_empty() {
        anyhow::bail!("Invalid parameter '{}'. Key cannot be empty.", s);
    }
    Ok((key.to_string(), value.to_string()))
}

/// Turns a pipeline failure into an error whose top line is operator-friendly.
fn surface(error: RequestError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

/// Run an arbitrary request and return the response data.
pub async fn request(
    client: &ApiClient,
    method: HttpMethod,
    endpoint: &str,
    params: &[(String, String)],
    body: Option<&str>,
    no_auth: bool,
) -> Result<Value> {
    let mut descriptor = RequestDescriptor::new(method, endpoint);
    for (key, value) in params {
        descriptor = descriptor.param(key.as_str(), value);
    }
    if let Some(body) = body {
        let body: Value = serde_json::from_str(body).context("Request body is not valid JSON")?;
        descriptor = descriptor.body(body);
    }
    if no_auth {
        descriptor = descriptor.without_auth();
    }

    let response = client.execute(descriptor).await.map_err(surface)?;
    Ok(response.data)
}

pub async fn list_users(
    client: &ApiClient,
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
) -> Result<Value> {
    let params = ListUsersParams {
        page,
        limit,
        sort_by: Some("createdAt".to_string()),
        sort_order: Some(SortOrder::Desc),
        search,
    };
    let response = client.users().list(&params).await.map_err(surface)?;
    Ok(response.data)
}

pub async fn get_user(client: &ApiClient, user_id: &str) -> Result<Value> {
    let response = client.users().get(user_id).await.map_err(surface)?;
    Ok(response.data)
}

pub async fn list_emergencies(
    client: &ApiClient,
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<AlertStatus>,
) -> Result<Value> {
    let params = ListEmergenciesParams {
        page,
        limit,
        status,
        ..Default::default()
    };
    let response = client.emergencies().list(&params).await.map_err(surface)?;
    Ok(response.data)
}

pub async fn resolve_emergency(client: &ApiClient, alert_id: &str) -> Result<Value> {
    let response = client
        .emergencies()
        .resolve(alert_id)
        .await
        .map_err(surface)?;
    Ok(response.data)
}

/// Pretty-printed JSON for stdout.
pub fn render(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to render response")
}
