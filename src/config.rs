//! Runtime settings read from the environment once at startup.

use std::env;

use thiserror::Error;

pub const TOKEN_VAR: &str = "JIRA_TOKEN";
pub const HOST_VAR: &str = "JIRA_HOST";
pub const MEETINGS_ISSUE_VAR: &str = "JIRA_MEETINGS_ISSUE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
}

/// Credentials and defaults for one run. Never written back anywhere.
#[derive(Clone)]
pub struct Settings {
    pub host: String,
    pub token: String,
    pub default_issue: Option<String>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host)
            .field("token", &"***")
            .field("default_issue", &self.default_issue)
            .finish()
    }
}

impl Settings {
    /// Loads `.env` (without overriding the real environment) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let token = read(TOKEN_VAR).ok_or(ConfigError::Missing(TOKEN_VAR))?;
        let host = read(HOST_VAR).ok_or(ConfigError::Missing(HOST_VAR))?;
        let default_issue = read(MEETINGS_ISSUE_VAR);

        Ok(Self {
            host,
            token,
            default_issue,
        })
    }
}
