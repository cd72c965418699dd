//! Top-level error for the CLI run.

use std::io;

use jira_api::JiraError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::input::InputError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("authentication failed: {0}")]
    Auth(#[source] JiraError),
    #[error("invalid worklog: {0}")]
    Input(#[from] InputError),
    #[error(transparent)]
    Jira(#[from] JiraError),
    #[error("console error: {0}")]
    Io(#[from] io::Error),
}
