//! Typed Jira REST API v2 client used by the worklog CLI.

pub mod client;
pub mod config;
pub mod date;
pub mod error;
pub mod models;

pub use client::JiraClient;
pub use config::JiraConfig;
pub use date::{convert_date, format_date};
pub use error::{JiraError, Result};
pub use models::{Issue, IssueFields, SearchResults, UserProfile};
