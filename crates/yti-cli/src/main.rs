use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use yti_cli::commands::{config as config_command, manictime, report, toggl};
use yti_cli::{Cli, Commands, Config, ConfigAction};

fn load_config(cli: &Cli) -> Result<Config> {
    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Manictime(args)) => {
            let config = load_config(&cli)?;
            manictime::run(args, &config)?;
        }
        Some(Commands::Toggl(args)) => {
            let config = load_config(&cli)?;
            toggl::run(args, &config)?;
        }
        Some(Commands::Report(args)) => {
            let config = load_config(&cli)?;
            report::run(&mut std::io::stdout(), args, &config)?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => {
                let config = load_config(&cli)?;
                config_command::show(&mut std::io::stdout(), &config)?;
            }
            ConfigAction::Set { option, value } => {
                config_command::set(cli.config.as_deref(), option, value)?;
            }
        },
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
