use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use jira_api::{JiraClient, JiraConfig};
use log::{debug, error, info};

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod issues;
pub mod prompt;
pub mod worklog;

use cli::{Cli, Command};
use config::Settings;
use error::AppError;
use prompt::{LinePrompt, Prompt, TerminalPrompt};

pub fn run() -> ExitCode {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .try_init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("failed to start runtime: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(execute(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    debug!("settings: {:?}", settings);

    let client = JiraClient::new(JiraConfig::new(&settings.host, &settings.token))?;
    let profile = client.check_auth().await.map_err(AppError::Auth)?;
    info!(
        "authenticated as {}",
        profile.label().unwrap_or("unknown user")
    );

    match cli.command_or_default() {
        Command::Worklog => {
            let mut prompt = console_prompt();
            let summary = worklog::run(
                &client,
                prompt.as_mut(),
                cli.mode(),
                settings.default_issue.as_deref(),
            )
            .await?;
            info!(
                "session finished: {} sent, {} declined, {} failed, {} invalid",
                summary.sent, summary.declined, summary.failed, summary.invalid
            );
            Ok(())
        }
        Command::MyIssues { limit, json } => {
            let mut stdout = io::stdout().lock();
            issues::list_assigned(&client, limit, json, &mut stdout).await
        }
        Command::Issue { key } => {
            let mut stdout = io::stdout().lock();
            issues::show(&client, &key, &mut stdout).await
        }
    }
}

fn console_prompt() -> Box<dyn Prompt> {
    if io::stdin().is_terminal() {
        Box::new(TerminalPrompt)
    } else {
        Box::new(LinePrompt::new(io::stdin().lock(), io::stdout()))
    }
}
