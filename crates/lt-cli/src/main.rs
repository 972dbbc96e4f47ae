use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lt_cli::commands::{convert, inspect, program, resolve};
use lt_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Some(Commands::Inspect { file, json }) => {
            inspect::run(&mut stdout, file, *json)?;
        }
        Some(Commands::Resolve {
            results,
            start_list,
            json,
        }) => {
            resolve::run(&mut stdout, results, start_list.as_deref(), *json, &config)?;
        }
        Some(Commands::Convert { input, to, out_dir }) => {
            convert::run(&mut stdout, input, to, out_dir.as_deref())?;
        }
        Some(Commands::Program {
            start_list_dir,
            output,
        }) => {
            program::run(&mut stdout, start_list_dir, output.as_deref())?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
