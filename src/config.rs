// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`ClientConfig`] loaded from
//! them at startup. The dev/production switch is not configured here: it is
//! fixed at build time by the `dev` cargo feature.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SCHEDULE_API_BASE_URL` | Backend base URL; paths are resolved against it | `http://127.0.0.1:5000/` |
//! | `SCHEDULE_TOKEN_FILE` | File holding the persisted bearer token | `<data_local_dir>/schedule-planner/token` |
//! | `SCHEDULE_REQUEST_TIMEOUT_SECS` | Per-request transport timeout | `10` |
//! | `SCHEDULE_SUCCESS_CONVENTION` | Business success code: `http` (200) or `legacy` (1) | `http` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::http::SuccessConvention;
use crate::mock::EnvironmentSwitch;
use crate::storage::StoragePaths;

/// Environment variable name for the backend base URL.
pub const API_BASE_URL_ENV: &str = "SCHEDULE_API_BASE_URL";

/// Environment variable name overriding the token file location.
pub const TOKEN_FILE_ENV: &str = "SCHEDULE_TOKEN_FILE";

/// Environment variable name for the transport timeout, in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "SCHEDULE_REQUEST_TIMEOUT_SECS";

/// Environment variable name selecting the business success code.
pub const SUCCESS_CONVENTION_ENV: &str = "SCHEDULE_SUCCESS_CONVENTION";

/// Environment variable name selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Backend the web client talked to during local development.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },

    #[error("{name}: {reason}")]
    InvalidConvention { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub token_file: PathBuf,
    pub request_timeout: Duration,
    pub success_convention: SuccessConvention,
    pub environment: EnvironmentSwitch,
}

impl ClientConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_optional = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let raw_url = env_optional(API_BASE_URL_ENV)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidUrl {
            name: API_BASE_URL_ENV,
            reason: e.to_string(),
        })?;

        let token_file = env_optional(TOKEN_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| StoragePaths::default().token_file());

        let request_timeout = match env_optional(REQUEST_TIMEOUT_ENV) {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        name: REQUEST_TIMEOUT_ENV,
                        value,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let success_convention = match env_optional(SUCCESS_CONVENTION_ENV) {
            Some(value) => value
                .parse::<SuccessConvention>()
                .map_err(|reason| ConfigError::InvalidConvention {
                    name: SUCCESS_CONVENTION_ENV,
                    reason,
                })?,
            None => SuccessConvention::default(),
        };

        Ok(Self {
            api_base_url,
            token_file,
            request_timeout,
            success_convention,
            environment: EnvironmentSwitch::from_build(),
        })
    }
}
