use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::retry::RetryPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("MONGO_URI must be set when STORE_BACKEND=mongo")]
    MissingMongoUri,

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo { uri: String },
    Memory,
}

/// What happens to comments, dependency rows and tasks that reference a
/// task or project being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    #[default]
    Cascade,
    Reject,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_name: String,
    pub bind_address: String,
    /// `None` allows any origin.
    pub frontend_origin: Option<String>,
    pub delete_policy: DeletePolicy,
    pub task_fetch: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match var("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("mongo") => StoreBackend::Mongo {
                uri: var("MONGO_URI")
                    .filter(|uri| !uri.trim().is_empty())
                    .ok_or(ConfigError::MissingMongoUri)?,
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                    reason: "expected mongo or memory",
                })
            }
        };

        let delete_policy = match var("DELETE_POLICY").as_deref().map(str::trim) {
            None | Some("") | Some("cascade") => DeletePolicy::Cascade,
            Some("reject") => DeletePolicy::Reject,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "DELETE_POLICY",
                    value: other.to_string(),
                    reason: "expected cascade or reject",
                })
            }
        };

        let defaults = RetryPolicy::default();
        let max_attempts = match parse_number(&var, "TASK_FETCH_ATTEMPTS")? {
            None => defaults.max_attempts,
            Some(0) => {
                return Err(ConfigError::Invalid {
                    key: "TASK_FETCH_ATTEMPTS",
                    value: "0".to_string(),
                    reason: "at least one attempt is required",
                })
            }
            Some(n) => u32::try_from(n).map_err(|_| ConfigError::Invalid {
                key: "TASK_FETCH_ATTEMPTS",
                value: n.to_string(),
                reason: "too many attempts",
            })?,
        };
        let base_delay = parse_number(&var, "TASK_FETCH_BASE_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.base_delay);

        Ok(Self {
            store_backend,
            database_name: var("DATABASE_NAME").unwrap_or_else(|| "taskflow".to_string()),
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            frontend_origin: var("FRONTEND_ORIGIN").filter(|origin| !origin.trim().is_empty()),
            delete_policy,
            task_fetch: RetryPolicy {
                max_attempts,
                base_delay,
            },
        })
    }
}

fn parse_number<F>(var: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected a non-negative integer",
        }),
    }
}
