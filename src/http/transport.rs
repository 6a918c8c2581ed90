//! Transport abstraction over the HTTP stack.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::request::HttpMethod;
use super::response::TransportResponse;

/// A fully built request, ready to be sent as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl OutboundRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Set a header, replacing any existing value (names compare case-insensitively).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Sends one request and returns whatever the server answered.
///
/// Implementations report non-2xx statuses as responses, not errors; an error
/// means the exchange itself failed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse>;
}

/// Transport backed by a reqwest [`Client`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Transport with a default client identifying itself as safewatch.
    ///
    /// Timeouts are enforced by the request pipeline, not by the client.
    pub fn with_default_client() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("safewatch/", env!("SAFEWATCH_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.context("Failed to send request")?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?
            .to_vec();

        debug!("{} {} -> {} ({} bytes)", request.method, request.url, status, body.len());

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
