//! The read → confirm → send loop behind the `worklog` command.

use jira_api::{format_date, JiraClient};
use log::{info, warn};

use crate::error::AppError;
use crate::input::{collect_interactive, collect_line, format_spent, Collected};
use crate::prompt::Prompt;

const LINE_MODE_HINT: &str = "Line mode, use -i for interactive prompts.\n\
Format: {YYYY-MM-DD|today|yest} {ISSUE} {SPENT_TIME} {COMMENT}. Enter q to quit.";
const INTERACTIVE_MODE_HINT: &str = "Interactive mode. Spent time is hours (3) or a duration \
(1h30m). Enter q as the issue to quit.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Line,
}

/// Counters reported when the loop ends.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub sent: usize,
    pub declined: usize,
    pub failed: usize,
    pub invalid: usize,
}

/// Runs until the user quits or input ends.
///
/// Interactive mode reports invalid input and asks again; in line mode invalid
/// input ends the run with an error. Rejected or failed requests are reported
/// and the loop moves on.
pub async fn run<P: Prompt + ?Sized>(
    client: &JiraClient,
    prompt: &mut P,
    mode: Mode,
    default_issue: Option<&str>,
) -> Result<Summary, AppError> {
    let mut summary = Summary::default();
    prompt.say(match mode {
        Mode::Interactive => INTERACTIVE_MODE_HINT,
        Mode::Line => LINE_MODE_HINT,
    })?;

    loop {
        let collected = match mode {
            Mode::Interactive => collect_interactive(prompt, default_issue),
            Mode::Line => collect_line(prompt),
        };
        let entry = match collected {
            Ok(Collected::Entry(entry)) => entry,
            Ok(Collected::Skip) => continue,
            Ok(Collected::Exit) => break,
            Err(AppError::Input(err)) if mode == Mode::Interactive => {
                summary.invalid += 1;
                prompt.say(&format!("Invalid worklog: {}", err))?;
                continue;
            }
            Err(err) => return Err(err),
        };

        prompt.say(&entry.to_string())?;
        if !prompt.confirm("Send?")? {
            summary.declined += 1;
            prompt.say("Not sent.")?;
            continue;
        }

        let date = format_date(entry.date);
        match client
            .add_worklog(&entry.issue_key, &date, entry.spent, &entry.comment)
            .await
        {
            Ok(()) => {
                summary.sent += 1;
                info!("logged {} on {} for {}", format_spent(entry.spent), entry.issue_key, date);
                prompt.say(&format!(
                    "Logged {} on {} for {}.",
                    format_spent(entry.spent),
                    entry.issue_key,
                    date
                ))?;
            }
            Err(err) => {
                summary.failed += 1;
                warn!("worklog for {} failed: {}", entry.issue_key, err);
                prompt.say(&format!("Failed to log work on {}: {}", entry.issue_key, err))?;
            }
        }
    }

    Ok(summary)
}
