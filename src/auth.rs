//! Identity provider abstraction.
//!
//! The request pipeline never inspects tokens; it only asks for one, and asks
//! again with `force_refresh` when the server rejects it.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::debug;
use std::sync::RwLock;

/// Source of bearer tokens for authenticated requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token for the current session.
    ///
    /// Fails when no session is active. With `force_refresh` the provider
    /// should try to obtain a fresh token instead of serving a cached one.
    async fn token(&self, force_refresh: bool) -> Result<String>;
}

/// Token provider backed by a fixed token (e.g. from `SAFEWATCH_TOKEN`).
///
/// `None` models a signed-out session. It has nothing to refresh from, so a
/// forced refresh returns the configured token unchanged.
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.is_empty())),
        }
    }

    /// A provider with no active session.
    pub fn signed_out() -> Self {
        Self::new(None)
    }

    /// Replace the session token; `None` signs out.
    pub fn set_token(&self, token: Option<String>) {
        let mut guard = match self.token.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = token.filter(|t| !t.is_empty());
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self, force_refresh: bool) -> Result<String> {
        let guard = match self.token.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if force_refresh {
            debug!("Static token provider cannot refresh, reusing configured token");
        }
        guard
            .clone()
            .ok_or_else(|| anyhow!("User not authenticated"))
    }
}
