use anyhow::Context;
use clap::Parser;

mod cli;
mod commands;
mod context;
mod output;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("psra error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();
    init_tracing(flags.quiet, flags.verbose)?;
    ui::init(&flags);

    let config = context::load_config(&flags)?;
    let ctx = context::AppContext::init(config)
        .context("failed to initialize psra application context")?;

    let command = cli.command;
    let mutates = command_mutates(&command);
    let result = commands::dispatch::dispatch(command, &ctx, &flags);
    if mutates {
        ctx.settle().await;
    }
    result
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("PSRA_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Commands that may post a notification before exiting.
fn command_mutates(command: &cli::Commands) -> bool {
    use crate::cli::subcommands::{
        IncidentCommands, NumberingCommands, SupportCommands, VolunteerCommands,
    };

    match command {
        cli::Commands::Incident { action } => {
            !matches!(action, IncidentCommands::List { .. } | IncidentCommands::Get { .. })
        }
        cli::Commands::Support { action } => !matches!(action, SupportCommands::List { .. }),
        cli::Commands::Volunteer { action } => !matches!(
            action,
            VolunteerCommands::List | VolunteerCommands::Get { .. } | VolunteerCommands::Standings
        ),
        cli::Commands::Numbering { action } => matches!(action, NumberingCommands::Reset),
        cli::Commands::ClearData => true,
        cli::Commands::Summary { .. } => false,
    }
}
