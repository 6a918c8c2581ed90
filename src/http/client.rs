//! API client: the authenticated request pipeline with timeout, backoff and
//! token-refresh retry.

use anyhow::Result;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use super::cancel::CancellationToken;
use super::error::RequestError;
use super::request::RequestDescriptor;
use super::response::{ApiResponse, TransportResponse};
use super::retry::{FailureKind, RetryState, Sleeper, TokioSleeper, Transition};
use super::transport::{OutboundRequest, ReqwestTransport, Transport};
use crate::auth::TokenProvider;
use crate::config::{ClientConfig, ConfigStore, ConfigUpdate};

const CONTENT_TYPE: &str = "Content-Type";
const ACCEPT: &str = "Accept";
const AUTHORIZATION: &str = "Authorization";
const API_KEY: &str = "X-API-Key";
const JSON: &str = "application/json";

/// Client for the admin API.
///
/// Calls are independent of each other; the only shared state is the
/// configuration store, read once at the start of every call.
#[derive(Clone)]
pub struct ApiClient {
    config: ConfigStore,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenProvider>,
    sleeper: Arc<dyn Sleeper>,
}

impl ApiClient {
    pub fn new(
        config: ConfigStore,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            tokens,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Client on the default reqwest transport.
    pub fn with_default_transport(
        config: ClientConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        let transport = ReqwestTransport::with_default_client()?;
        Ok(Self::new(
            ConfigStore::new(config),
            Arc::new(transport),
            tokens,
        ))
    }

    /// Replace how the client waits between retries.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<ClientConfig> {
        self.config.snapshot()
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config
    }

    /// Merge `update` into the configuration. In-flight calls keep their snapshot.
    pub fn update_config(&self, update: ConfigUpdate) {
        self.config.update(update);
    }

    /// Perform one logical API operation.
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<ApiResponse, RequestError> {
        self.execute_with_cancel(descriptor, &CancellationToken::new())
            .await
    }

    /// Like [`execute`](Self::execute), but gives up with
    /// [`RequestError::Cancelled`] as soon as `cancel` fires.
    #[tracing::instrument(
        skip(self, descriptor, cancel),
        fields(method = %descriptor.method, endpoint = %descriptor.endpoint)
    )]
    pub async fn execute_with_cancel(
        &self,
        descriptor: RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, RequestError> {
        let config = self.config.snapshot();
        let timeout = descriptor.timeout.unwrap_or(config.timeout);
        let max_retries = descriptor.max_retries.unwrap_or(config.max_retries);

        let url = descriptor.build_url(&config.base_url)?;
        let mut request = OutboundRequest::new(descriptor.method, url.as_str());
        request.set_header(CONTENT_TYPE, JSON);
        request.set_header(ACCEPT, JSON);
        request.body = descriptor.serialized_body()?;

        if descriptor.use_auth {
            let token = self.bearer_token(cancel).await?;
            request.set_header(AUTHORIZATION, format!("Bearer {}", token));
            request.set_header(API_KEY, config.api_key.as_str());
        }

        debug!("{} {}", request.method, request.url);

        let mut state = RetryState::new(max_retries, descriptor.use_auth);
        loop {
            let (kind, error) = match self.send_once(&request, timeout, cancel).await {
                Ok(response) if response.is_success() => {
                    debug!("{} {} succeeded with {}", request.method, request.url, response.status);
                    return ApiResponse::from_transport(response);
                }
                Ok(response) => {
                    let error = response.into_error();
                    let kind = if error.is_auth_rejection() {
                        FailureKind::AuthRejected
                    } else {
                        FailureKind::Fatal
                    };
                    (kind, error)
                }
                Err(error) if error.is_transient() => (FailureKind::Transient, error),
                Err(error) => return Err(error),
            };

            match state.on_failure(kind) {
                Transition::AuthRetry => {
                    warn!(
                        "{} {}: {}, refreshing token and retrying",
                        request.method, request.url, error
                    );
                    let token = self.bearer_token(cancel).await?;
                    request.set_header(AUTHORIZATION, format!("Bearer {}", token));
                }
                Transition::BackoffWait(delay) => {
                    warn!(
                        "{} {}: attempt {}/{} failed ({}), retrying in {}ms...",
                        request.method,
                        request.url,
                        state.attempt(),
                        state.max_retries() + 1,
                        error,
                        delay.as_millis()
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(RequestError::Cancelled),
                        _ = self.sleeper.sleep(delay) => {}
                    }
                }
                Transition::Failed => {
                    debug!("{} {}: giving up: {}", request.method, request.url, error);
                    return Err(error);
                }
            }
        }
    }

    /// One attempt, raced against the timeout and the cancellation signal.
    async fn send_once(
        &self,
        request: &OutboundRequest,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, RequestError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RequestError::Cancelled),
            outcome = tokio::time::timeout(timeout, self.transport.send(request.clone())) => {
                match outcome {
                    Ok(Ok(response)) => Ok(response),
                    Ok(Err(e)) => Err(RequestError::Network(e)),
                    Err(_) => Err(RequestError::Timeout(timeout)),
                }
            }
        }
    }

    /// Freshly issued bearer token.
    async fn bearer_token(&self, cancel: &CancellationToken) -> Result<String, RequestError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RequestError::Cancelled),
            token = self.tokens.token(true) => {
                token.map_err(|e| RequestError::Authentication(format!("{:#}", e)))
            }
        }
    }
}
