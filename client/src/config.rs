//! Client configuration loaded via OrthoConfig.

use std::ffi::OsString;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

pub use crate::domain::ConfigError;

const PROGRAM_NAME: &str = "admin-login";
const DEFAULT_DEVICE_TYPE: &str = "WEB";
const DEFAULT_STATE_DIR: &str = ".admin-client";
const AUTH_BASE_URL_ENV: &str = "ADMIN_CLIENT_AUTH_BASE_URL";

/// Endpoints and local state locations used by the clients.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADMIN_CLIENT")]
pub struct ClientSettings {
    /// Base URL prepended to every general API endpoint.
    pub api_base_url: Option<String>,
    /// Base URL of the OTP authentication endpoints.
    pub auth_base_url: Option<String>,
    /// Device type reported when verifying a code.
    pub device_type: Option<String>,
    /// Directory holding the durable store.
    pub state_dir: Option<PathBuf>,
}

impl ClientSettings {
    /// Load settings from the environment and configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a source holds invalid values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args([OsString::from(PROGRAM_NAME)])
    }

    /// Load settings with `args` as the command line.
    ///
    /// `args` starts with the program name and may carry `--api-base-url`,
    /// `--auth-base-url`, `--device-type`, and `--state-dir`. Flags take
    /// precedence over the environment, which takes precedence over files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a source holds invalid values or
    /// `args` contains an unknown flag.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::load_from_iter(args).map_err(|err| ConfigError::Load {
            message: err.to_string(),
        })
    }

    /// Base URL for general API calls; empty when unset.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or_default()
    }

    /// Base URL for the OTP endpoints with one trailing slash removed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the setting is absent or blank.
    pub fn auth_base_url(&self) -> Result<&str, ConfigError> {
        match self.auth_base_url.as_deref() {
            Some(url) if !url.is_empty() => Ok(url.strip_suffix('/').unwrap_or(url)),
            _ => Err(ConfigError::Missing {
                setting: "auth_base_url",
                env_var: AUTH_BASE_URL_ENV,
            }),
        }
    }

    /// Device type sent on verification, `WEB` by default.
    pub fn device_type(&self) -> &str {
        self.device_type.as_deref().unwrap_or(DEFAULT_DEVICE_TYPE)
    }

    /// Directory for durable state, `.admin-client` by default.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
    }
}
