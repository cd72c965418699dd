//! Command-line arguments.

use clap::{Parser, Subcommand};

use crate::input::parse_issue_key;
use crate::issues::DEFAULT_LIMIT;
use crate::worklog::Mode;

#[derive(Parser, Debug)]
#[command(name = "jira-worklog")]
#[command(about = "Log work time against Jira issues")]
#[command(version)]
pub struct Cli {
    /// Prompt for each field instead of reading one-line worklogs
    #[arg(short, long, global = true)]
    pub interactive: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log work on issues (default)
    Worklog,

    /// List issues ever assigned to you, most recently updated first
    MyIssues {
        /// Maximum number of issues to fetch
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_LIMIT,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        limit: u32,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the summary of one issue
    Issue {
        /// Issue key, e.g. INT-18
        #[arg(value_parser = parse_issue_key)]
        key: String,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Worklog)
    }

    pub fn mode(&self) -> Mode {
        if self.interactive {
            Mode::Interactive
        } else {
            Mode::Line
        }
    }
}
