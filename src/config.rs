//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::router::RolePolicy;

pub const DEFAULT_API_URL: &str = "http://47.76.29.63:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const STORAGE_FILE_NAME: &str = "storage.json";

pub const API_URL_VAR: &str = "ATTENDANCE_API_URL";
pub const STORAGE_PATH_VAR: &str = "ATTENDANCE_STORAGE_PATH";
pub const REQUEST_TIMEOUT_VAR: &str = "ATTENDANCE_REQUEST_TIMEOUT_SECS";
pub const ENFORCE_ROLES_VAR: &str = "ATTENDANCE_ENFORCE_ROLES";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("no config directory available; set {STORAGE_PATH_VAR}")]
    NoStorageDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL including the `/api` prefix, without a trailing slash.
    pub api_url: String,
    pub storage_path: PathBuf,
    pub request_timeout: Duration,
    pub role_policy: RolePolicy,
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `ATTENDANCE_API_URL`: default [`DEFAULT_API_URL`]
    /// - `ATTENDANCE_STORAGE_PATH`: default `storage.json` in the platform config dir
    /// - `ATTENDANCE_REQUEST_TIMEOUT_SECS`: default 10
    /// - `ATTENDANCE_ENFORCE_ROLES`: boolean, default off
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unparseable base URL, or when no storage
    /// path is given and the platform has no config directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(&lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_owned()))?;

        let storage_path = match lookup(STORAGE_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_storage_path()?,
        };

        let timeout_secs = lookup(REQUEST_TIMEOUT_VAR)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let enforce = lookup(ENFORCE_ROLES_VAR).as_deref().and_then(parse_bool).unwrap_or(false);

        Ok(Self {
            api_url,
            storage_path,
            request_timeout: Duration::from_secs(timeout_secs),
            role_policy: RolePolicy::from_enforce(enforce),
        })
    }
}

/// Trim and validate a base URL, dropping trailing slashes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidApiUrl`] when the URL does not parse or is not http(s).
pub fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidApiUrl { url: raw.to_owned(), reason };
    let parsed = reqwest::Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    Ok(trimmed.to_owned())
}

/// `storage.json` under the platform config directory.
///
/// # Errors
///
/// Returns [`ConfigError::NoStorageDir`] when no home directory can be found.
pub fn default_storage_path() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("com", "attendance", "attendance")
        .map(|dirs| dirs.config_dir().join(STORAGE_FILE_NAME))
        .ok_or(ConfigError::NoStorageDir)
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
