mod cli;
mod commands;
mod config;
mod logging;
mod preflight;
mod report;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use cli::*;
use commands::configure::ConfigUpdate;
use preflight::UsageError;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = dispatch(cli.command);

    // Invocation problems are reported the same way clap reports bad arguments
    if let Some(usage) = result.as_ref().err().and_then(|e| e.downcast_ref::<UsageError>()) {
        Cli::command().error(usage.kind, &usage.message).exit();
    }
    result
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Dump { pid, args } => commands::dump::handle_pid(pid, &args),

        Commands::Run {
            delay,
            kill,
            args,
            command,
        } => commands::dump::handle_run(&command, delay, kill, &args),

        Commands::Maps { pid, readable } => commands::maps::handle(pid, readable),

        Commands::Configure {
            output,
            delay,
            parse_policy,
            require_root,
            show,
        } => commands::configure::handle(
            ConfigUpdate {
                output,
                delay,
                parse_policy: parse_policy.map(Into::into),
                require_root,
            },
            show,
        ),
    }
}
