//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod ac;
pub mod activities;
pub mod config_cmd;
pub mod images;
pub mod notify;
pub mod util;

use campus_core::{CommandResult, Console, ConsoleConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: &ConsoleConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        // AC control talks to the realtime store only.
        Command::Ac(args) => ac::handle(config, args, global).await,
        Command::Activities(args) => activities::handle(&backend(config)?, args, global).await,
        Command::Images(args) => images::handle(&backend(config)?, args, global).await,
        Command::Notify(args) => notify::handle(&backend(config)?, args, global).await,
        Command::Ping => ping(&backend(config)?, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are not dispatched".into(),
        )),
    }
}

fn backend(config: &ConsoleConfig) -> Result<Console, CliError> {
    if config.backend_url.is_none() {
        return Err(CliError::NotConfigured {
            service: "backend".into(),
            flag: "backend".into(),
            path: crate::config::config_path().display().to_string(),
        });
    }
    Ok(Console::new(config)?)
}

async fn ping(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    console.ping().await?;
    if !global.quiet {
        eprintln!("Backend is up");
    }
    Ok(())
}

/// Error for a command result the handler does not expect.
fn unexpected(result: &CommandResult) -> CliError {
    CliError::Internal(format!("unexpected command result: {result:?}"))
}
