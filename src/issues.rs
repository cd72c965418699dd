//! Read-only issue commands: `my-issues` and `issue`.

use std::io::Write;

use jira_api::{Issue, JiraClient};
use serde::Serialize;

use crate::error::AppError;

pub const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, Serialize)]
struct IssueRow<'a> {
    key: &'a str,
    summary: &'a str,
}

impl<'a> From<&'a Issue> for IssueRow<'a> {
    fn from(issue: &'a Issue) -> Self {
        Self {
            key: &issue.key,
            summary: issue.summary(),
        }
    }
}

/// Prints issues ever assigned to the current user, most recently updated first.
pub async fn list_assigned<W: Write>(
    client: &JiraClient,
    limit: u32,
    json: bool,
    out: &mut W,
) -> Result<(), AppError> {
    let issues = client.ever_assigned_issues(limit).await?;
    log::info!("fetched {} assigned issues", issues.len());

    if json {
        let rows: Vec<IssueRow> = issues.iter().map(IssueRow::from).collect();
        serde_json::to_writer_pretty(&mut *out, &rows).map_err(std::io::Error::from)?;
        writeln!(out)?;
        return Ok(());
    }

    if issues.is_empty() {
        writeln!(out, "No issues found.")?;
        return Ok(());
    }
    let width = issues.iter().map(|issue| issue.key.len()).max().unwrap_or(0);
    for issue in &issues {
        write_issue(out, issue, width)?;
    }
    Ok(())
}

pub async fn show<W: Write>(client: &JiraClient, key: &str, out: &mut W) -> Result<(), AppError> {
    let issue = client.issue(key).await?;
    write_issue(out, &issue, issue.key.len())
}

fn write_issue<W: Write>(out: &mut W, issue: &Issue, width: usize) -> Result<(), AppError> {
    writeln!(out, "{:<width$}  {}", issue.key, issue.summary(), width = width)?;
    Ok(())
}
