use std::process::ExitCode;

fn main() -> ExitCode {
    jira_worklog_lib::run()
}
