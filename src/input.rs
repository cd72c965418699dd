//! Turns console input into worklog entries.
//!
//! Two shapes are accepted: field-by-field prompts, and a single line of the
//! form `{YYYY-MM-DD|today|yest} {ISSUE} {SPENT_TIME} {COMMENT...}`.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use jira_api::{convert_date, format_date};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::error::AppError;
use crate::prompt::Prompt;

static DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:\d+\.?\d*|\.\d+)(?:ns|us|µs|ms|h|m|s))+$").expect("invalid duration regex")
});
static DURATION_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+\.?\d*|\.\d+)(ns|us|µs|ms|h|m|s)").expect("invalid duration token regex")
});
/// Project key plus number (`INT-18`), or a numeric issue id.
static ISSUE_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9_]*-\d+|\d+)$").expect("invalid issue key regex")
});

const EXIT_COMMANDS: [&str; 3] = ["q", "quit", "exit"];
const MIN_LINE_TOKENS: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("no issue given and no default issue configured")]
    MissingIssue,
    #[error("can't parse date, the layout must be YYYY-MM-DD|today|yest")]
    DateFormat,
    #[error("can't parse spent time '{0}', use hours (3) or a duration like 1h30m or 1500ms")]
    InvalidDuration(String),
    #[error("'{0}' is not an issue key, expected something like INT-18")]
    InvalidIssueKey(String),
    #[error("expected at least 3 fields (date issue spent [comment]), got {0}")]
    TooFewTokens(usize),
}

/// A worklog ready to be confirmed and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogEntry {
    pub issue_key: String,
    pub date: NaiveDate,
    pub spent: Duration,
    pub comment: String,
}

impl fmt::Display for WorklogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.issue_key,
            format_date(self.date),
            format_spent(self.spent)
        )?;
        if !self.comment.is_empty() {
            write!(f, " {}", self.comment)?;
        }
        Ok(())
    }
}

/// Outcome of one attempt at reading an entry.
#[derive(Debug, PartialEq, Eq)]
pub enum Collected {
    Entry(WorklogEntry),
    Skip,
    Exit,
}

pub fn is_exit_command(text: &str) -> bool {
    let text = text.trim();
    EXIT_COMMANDS
        .iter()
        .any(|command| text.eq_ignore_ascii_case(command))
}

pub fn parse_date(text: &str) -> Result<NaiveDate, InputError> {
    convert_date(text.trim()).map_err(|_| InputError::DateFormat)
}

pub fn parse_issue_key(text: &str) -> Result<String, InputError> {
    let key = text.trim();
    if ISSUE_KEY_REGEX.is_match(key) {
        Ok(key.to_string())
    } else {
        Err(InputError::InvalidIssueKey(key.to_string()))
    }
}

/// Parses spent time. A bare integer means hours, anything else must be a
/// sequence of `<number><unit>` groups such as `90m`, `1h30m` or `.5h`.
/// Units are `h`, `m`, `s`, `ms`, `us` (or `µs`) and `ns`.
pub fn parse_spent(text: &str) -> Result<Duration, InputError> {
    let text = text.trim();
    let invalid = || InputError::InvalidDuration(text.to_string());

    let seconds = if let Ok(hours) = text.parse::<u64>() {
        hours.checked_mul(3600).ok_or_else(invalid)? as f64
    } else if DURATION_REGEX.is_match(text) {
        let mut total = 0f64;
        for capture in DURATION_TOKEN_REGEX.captures_iter(text) {
            let value = capture[1].parse::<f64>().map_err(|_| invalid())?;
            let unit = match &capture[2] {
                "h" => 3600.0,
                "m" => 60.0,
                "s" => 1.0,
                "ms" => 1e-3,
                "us" | "µs" => 1e-6,
                _ => 1e-9,
            };
            total += value * unit;
        }
        total
    } else {
        return Err(invalid());
    };

    let seconds = seconds.round();
    if !seconds.is_finite() || seconds < 1.0 {
        return Err(invalid());
    }
    Ok(Duration::from_secs(seconds as u64))
}

/// Compact rendering such as `2h`, `1h30m` or `45s`.
pub fn format_spent(spent: Duration) -> String {
    let total = spent.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if seconds > 0 || out.is_empty() {
        out.push_str(&format!("{}s", seconds));
    }
    out
}

/// Parses `date issue spent [comment words...]`.
pub fn parse_line(line: &str) -> Result<WorklogEntry, InputError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_LINE_TOKENS {
        return Err(InputError::TooFewTokens(tokens.len()));
    }

    let date = parse_date(tokens[0])?;
    let issue_key = parse_issue_key(tokens[1])?;
    let spent = parse_spent(tokens[2])?;

    Ok(WorklogEntry {
        issue_key,
        date,
        spent,
        comment: tokens[3..].join(" "),
    })
}

/// Reads one raw line and parses it.
pub fn collect_line<P: Prompt + ?Sized>(prompt: &mut P) -> Result<Collected, AppError> {
    let Some(line) = prompt.ask("Raw worklog")? else {
        return Ok(Collected::Exit);
    };
    if line.trim().is_empty() {
        return Ok(Collected::Skip);
    }
    if is_exit_command(&line) {
        return Ok(Collected::Exit);
    }
    Ok(Collected::Entry(parse_line(&line)?))
}

/// Prompts for each field in turn, applying defaults for blank answers.
pub fn collect_interactive<P: Prompt + ?Sized>(
    prompt: &mut P,
    default_issue: Option<&str>,
) -> Result<Collected, AppError> {
    let issue_label = match default_issue {
        Some(issue) => format!("Issue [{}]", issue),
        None => "Issue".to_string(),
    };
    let Some(issue) = prompt.ask(&issue_label)? else {
        return Ok(Collected::Exit);
    };
    if is_exit_command(&issue) {
        return Ok(Collected::Exit);
    }
    let issue_key = match issue.trim() {
        "" => parse_issue_key(default_issue.ok_or(InputError::MissingIssue)?)?,
        key => parse_issue_key(key)?,
    };

    let Some(date) = prompt.ask("Date [today]")? else {
        return Ok(Collected::Exit);
    };
    let date = match date.trim() {
        "" => parse_date("today")?,
        text => parse_date(text)?,
    };

    let Some(spent) = prompt.ask("Spent time")? else {
        return Ok(Collected::Exit);
    };
    let spent = parse_spent(&spent)?;

    let Some(comment) = prompt.ask("Comment")? else {
        return Ok(Collected::Exit);
    };

    Ok(Collected::Entry(WorklogEntry {
        issue_key,
        date,
        spent,
        comment: comment.trim().to_string(),
    }))
}
