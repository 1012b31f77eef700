use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wl_cli::commands::{awards, delete, evaluate, export, import, list, log, status};
use wl_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout().lock();
    match command {
        Commands::Log(args) => log::run(&mut stdout, args, &config)?,
        Commands::List(args) => list::run(&mut stdout, args, &config)?,
        Commands::Delete(args) => delete::run(&mut stdout, args, &config)?,
        Commands::Awards(args) => awards::run(&mut stdout, args, &config)?,
        Commands::Evaluate(args) => evaluate::run(&mut stdout, args, &config)?,
        Commands::Status => status::run(&mut stdout, &config)?,
        Commands::Import(args) => import::run(&mut stdout, args, &config)?,
        Commands::Export => export::run(&mut stdout, &config)?,
    }

    Ok(())
}
