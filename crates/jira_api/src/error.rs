//! Error model used by Jira API client operations.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JiraError>;

/// Failures a Jira call can end in. Rejected requests keep their status and body.
#[derive(Debug, Error)]
pub enum JiraError {
    #[error("status code {}, body: {message}", .status.as_u16())]
    Http { status: StatusCode, message: String },
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("can't parse date, the layout must be YYYY-MM-DD|today|yest")]
    DateFormat,
    #[error("'{0}' is not a usable issue key")]
    InvalidIssueKey(String),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl JiraError {
    /// Constructs an HTTP error variant from a rejected response.
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        JiraError::Http {
            status,
            message: message.into(),
        }
    }

    /// Returns the HTTP status for rejected responses, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            JiraError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for JiraError {
    /// Converts reqwest errors into semantic JiraError variants.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JiraError::Timeout(err.to_string())
        } else if err.is_status() {
            let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            JiraError::Http {
                status,
                message: err.to_string(),
            }
        } else if err.is_connect() || err.is_request() {
            JiraError::Network(err.to_string())
        } else if err.is_decode() {
            JiraError::Serialization(err.to_string())
        } else {
            JiraError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for JiraError {
    /// Converts serde_json decode/encode failures into serialization errors.
    fn from(err: serde_json::Error) -> Self {
        JiraError::Serialization(err.to_string())
    }
}
