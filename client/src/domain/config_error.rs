//! Configuration failures the domain reports without depending on the loader.

use thiserror::Error;

/// Errors raised while resolving client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting has no value.
    #[error("{setting} is not configured; set {env_var} (e.g. https://api.example.com)")]
    Missing {
        /// Name of the missing setting.
        setting: &'static str,
        /// Environment variable that supplies it.
        env_var: &'static str,
    },
    /// Settings could not be loaded from the environment, config files, or
    /// command-line flags.
    #[error("failed to load client settings: {message}")]
    Load {
        /// Description of the loader failure.
        message: String,
    },
}
