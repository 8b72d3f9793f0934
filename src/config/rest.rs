use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::core::cache::{CachePolicy, DEFAULT_LIFETIME};
use crate::core::registry::AdapterOptions;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_url, Validate};

fn default_cache_lifetime() -> u64 {
    DEFAULT_LIFETIME.as_millis() as u64
}

fn default_true() -> bool {
    true
}

/// Options of the REST adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// camelCase wire property names instead of snake_case.
    #[serde(default)]
    pub camelize: bool,
    /// Instance cache lifetime in milliseconds; 0 keeps instances without expiry.
    #[serde(default = "default_cache_lifetime", alias = "instanceCacheLifetime")]
    pub instance_cache_lifetime: u64,
    /// `false` turns the identity map off entirely.
    #[serde(default = "default_true", alias = "instanceCache")]
    pub instance_cache: bool,
    #[serde(default, alias = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            host: None,
            username: None,
            password: None,
            camelize: false,
            instance_cache_lifetime: default_cache_lifetime(),
            instance_cache: true,
            timeout_seconds: None,
        }
    }
}

impl RestConfig {
    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    /// 從 registry 傳入的選項解析配置
    pub fn from_options(options: AdapterOptions) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(options))?)
    }

    pub fn cache_policy(&self) -> CachePolicy {
        if !self.instance_cache {
            return CachePolicy::Disabled;
        }
        CachePolicy::from_lifetime(Duration::from_millis(self.instance_cache_lifetime))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for RestConfig {
    fn validate(&self) -> Result<()> {
        if let Some(host) = &self.host {
            validate_url("host", host)?;
        }
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}
