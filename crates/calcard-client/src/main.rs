//! calcard CLI entry point.

use std::process::ExitCode;

use calcard_core::{TracingConfig, TracingOutputFormat, init_tracing};
use clap::Parser;

use calcard_client::cli::{Cli, Command, ConfigAction};
use calcard_client::commands;
use calcard_client::config::ClientConfig;
use calcard_client::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut tracing_config = TracingConfig::cli(cli.debug || config.debug);
    if cli.log_json {
        tracing_config = tracing_config.with_format(TracingOutputFormat::Json);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };
    if let Some(days) = cli.days {
        config.card.number_of_days = days;
    }
    Ok(config)
}

async fn run(cli: Cli, config: ClientConfig) -> ClientResult<()> {
    match cli.command {
        None | Some(Command::Agenda) => commands::agenda::run(&config, cli.json).await,
        Some(Command::Watch { interval }) => {
            commands::watch::run(&config, interval, cli.json).await
        }
        Some(Command::Check) => commands::config::check(&config),
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
