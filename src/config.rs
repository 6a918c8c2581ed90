//! Client configuration and the snapshot store shared by in-flight requests.
//!
//! A request reads the configuration exactly once, before its retry loop
//! starts. Updates build a new [`ClientConfig`] and swap it in whole, so a
//! request never observes a half-applied update.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Deployment the admin panel talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Staging,
    Development,
    Local,
}

impl Environment {
    /// Default API base URL of this deployment.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.womensafety.org/v1",
            Environment::Staging => "https://staging-api.womensafety.org/v1",
            Environment::Development => "https://dev-api.womensafety.org/v1",
            Environment::Local => "http://localhost:5000/api/v1",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Staging => write!(f, "staging"),
            Environment::Development => write!(f, "development"),
            Environment::Local => write!(f, "local"),
        }
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" | "dev" => Ok(Environment::Development),
            "local" => Ok(Environment::Local),
            _ => anyhow::bail!(
                "Unknown environment: {}. Expected production, staging, development, or local.",
                s
            ),
        }
    }
}

/// Settings read by every request.
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Retries after the first attempt; a call makes at most `max_retries + 1` attempts.
    pub max_retries: u32,
    pub environment: Environment,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &mask(&self.api_secret))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("environment", &self.environment)
            .finish()
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "********" }
}

impl ClientConfig {
    /// Configuration pointing at the default base URL of `environment`.
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            base_url: environment.default_base_url().to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            environment,
        }
    }

    /// Switch the base URL to another API version, e.g. `v2`.
    ///
    /// `v1` (or an empty version) leaves the URL untouched.
    pub fn with_api_version(mut self, version: &str) -> Self {
        if !version.is_empty() && version != "v1" {
            self.base_url = self.base_url.replacen("/v1", &format!("/{}", version), 1);
        }
        self
    }

    /// Returns a copy with every field set in `update` replaced.
    pub fn merged(&self, update: ConfigUpdate) -> Self {
        Self {
            base_url: update.base_url.unwrap_or_else(|| self.base_url.clone()),
            api_key: update.api_key.unwrap_or_else(|| self.api_key.clone()),
            api_secret: update.api_secret.unwrap_or_else(|| self.api_secret.clone()),
            timeout: update.timeout.unwrap_or(self.timeout),
            max_retries: update.max_retries.unwrap_or(self.max_retries),
            environment: update.environment.unwrap_or(self.environment),
        }
    }
}

/// Partial configuration; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub timeout: Option<Duration>,
    pub max_retries: Option<u32>,
    pub environment: Option<Environment>,
}

/// Shared handle to the current configuration snapshot.
///
/// Cloning the store shares the same snapshot slot.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    current: Arc<RwLock<Arc<ClientConfig>>>,
}

impl ConfigStore {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// The configuration as of now. Later updates do not affect the returned value.
    pub fn snapshot(&self) -> Arc<ClientConfig> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Replace the whole configuration.
    pub fn replace(&self, config: ClientConfig) {
        let next = Arc::new(config);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    /// Merge `update` into the current configuration, last write wins per field.
    pub fn update(&self, update: ConfigUpdate) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = guard.merged(update);
        *guard = Arc::new(next);
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.womensafety.org/v1");
        assert_eq!(config.timeout, Duration::from_millis(30_000));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_environment_base_urls() {
        assert_eq!(
            ClientConfig::for_environment(Environment::Staging).base_url,
            "https://staging-api.womensafety.org/v1"
        );
        assert_eq!(
            ClientConfig::for_environment(Environment::Development).base_url,
            "https://dev-api.womensafety.org/v1"
        );
        assert_eq!(
            ClientConfig::for_environment(Environment::Local).base_url,
            "http://localhost:5000/api/v1"
        );
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(
            "Production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("local".parse::<Environment>().unwrap(), Environment::Local);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_display_roundtrips_through_parse() {
        for env in [
            Environment::Production,
            Environment::Staging,
            Environment::Development,
            Environment::Local,
        ] {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), env);
        }
    }

    #[test]
    fn test_with_api_version() {
        let config = ClientConfig::default().with_api_version("v2");
        assert_eq!(config.base_url, "https://api.womensafety.org/v2");

        let config = ClientConfig::for_environment(Environment::Local).with_api_version("v3");
        assert_eq!(config.base_url, "http://localhost:5000/api/v3");

        let config = ClientConfig::default().with_api_version("v1");
        assert_eq!(config.base_url, "https://api.womensafety.org/v1");
    }

    #[test]
    fn test_debug_masks_secret() {
        let config = ClientConfig {
            api_secret: "super-secret".into(),
            ..ClientConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("********"));
    }

    #[test]
    fn test_update_merges_only_set_fields() {
        let store = ConfigStore::default();
        store.update(ConfigUpdate {
            api_key: Some("key-1".into()),
            max_retries: Some(5),
            ..Default::default()
        });

        let config = store.snapshot();
        assert_eq!(config.api_key, "key-1");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.base_url, "https://api.womensafety.org/v1");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_update_last_write_wins() {
        let store = ConfigStore::default();
        store.update(ConfigUpdate {
            api_key: Some("first".into()),
            ..Default::default()
        });
        store.update(ConfigUpdate {
            api_key: Some("second".into()),
            ..Default::default()
        });
        assert_eq!(store.snapshot().api_key, "second");
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_updates() {
        let store = ConfigStore::default();
        let before = store.snapshot();

        store.update(ConfigUpdate {
            base_url: Some("https://other.example.com".into()),
            ..Default::default()
        });

        assert_eq!(before.base_url, "https://api.womensafety.org/v1");
        assert_eq!(store.snapshot().base_url, "https://other.example.com");
    }

    #[test]
    fn test_clones_share_the_same_slot() {
        let store = ConfigStore::default();
        let other = store.clone();
        other.replace(ClientConfig::for_environment(Environment::Staging));
        assert_eq!(store.snapshot().environment, Environment::Staging);
    }
}
