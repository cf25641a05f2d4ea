//! Provider block settings with environment variable fallbacks
//!
//! A value set in the provider block wins over the environment.

use std::time::Duration;
use thiserror::Error;
use tfplug::types::{AttributePath, Dynamic, DynamicValue};

use crate::api::RetryPolicy;

pub const ENV_ENDPOINT: &str = "OCI_ENDPOINT";
pub const ENV_REGION: &str = "OCI_REGION";
pub const ENV_API_TOKEN: &str = "OCI_API_TOKEN";
pub const ENV_INSECURE: &str = "OCI_INSECURE";
pub const ENV_DISABLE_AUTO_RETRIES: &str = "OCI_DISABLE_AUTO_RETRIES";
pub const ENV_RETRY_DURATION_SECONDS: &str = "OCI_RETRY_DURATION_SECONDS";

pub const DEFAULT_RETRY_DURATION_SECONDS: u64 = 600;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("endpoint or region is required (set in provider config or OCI_ENDPOINT/OCI_REGION env vars)")]
    MissingEndpoint,

    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub insecure: bool,
    pub disable_auto_retries: bool,
    pub retry_duration: Duration,
}

impl ProviderConfig {
    pub fn from_config(config: &DynamicValue) -> Result<Self, ConfigError> {
        let endpoint = match string_setting(config, "endpoint", ENV_ENDPOINT) {
            Some(endpoint) => endpoint,
            None => match string_setting(config, "region", ENV_REGION) {
                Some(region) => endpoint_for_region(&region),
                None => return Err(ConfigError::MissingEndpoint),
            },
        };

        let retry_seconds = match config.get(&AttributePath::new("retry_duration_seconds")) {
            Some(Dynamic::Number(n)) if *n >= 0.0 => *n as u64,
            Some(Dynamic::Number(n)) => {
                return Err(ConfigError::InvalidValue {
                    name: "retry_duration_seconds".to_string(),
                    value: n.to_string(),
                    reason: "must not be negative".to_string(),
                })
            }
            _ => match non_empty_env(ENV_RETRY_DURATION_SECONDS) {
                Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                    name: ENV_RETRY_DURATION_SECONDS.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
                None => DEFAULT_RETRY_DURATION_SECONDS,
            },
        };

        Ok(Self {
            endpoint,
            api_token: string_setting(config, "api_token", ENV_API_TOKEN),
            insecure: bool_setting(config, "insecure", ENV_INSECURE)?,
            disable_auto_retries: bool_setting(
                config,
                "disable_auto_retries",
                ENV_DISABLE_AUTO_RETRIES,
            )?,
            retry_duration: Duration::from_secs(retry_seconds),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::for_service(self.disable_auto_retries, self.retry_duration)
    }
}

pub fn endpoint_for_region(region: &str) -> String {
    format!("https://database.{}.oraclecloud.com", region)
}

fn string_setting(config: &DynamicValue, name: &str, env: &str) -> Option<String> {
    match config.get(&AttributePath::new(name)) {
        Some(Dynamic::String(value)) if !value.is_empty() => Some(value.clone()),
        _ => non_empty_env(env),
    }
}

fn bool_setting(config: &DynamicValue, name: &str, env: &str) -> Result<bool, ConfigError> {
    if let Some(Dynamic::Bool(value)) = config.get(&AttributePath::new(name)) {
        return Ok(*value);
    }
    match non_empty_env(env) {
        Some(raw) => raw
            .parse::<bool>()
            .map_err(|e| ConfigError::InvalidValue {
                name: env.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        None => Ok(false),
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
