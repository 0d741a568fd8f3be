use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use swx_core::TimeFormat;
use swx_log::TimeLog;
use tracing_subscriber::EnvFilter;

use swx_cli::commands::{print, rename, status, switch};
use swx_cli::{Cli, Commands, Config};

/// Load config and open the time log, ensuring the parent directory exists.
fn open_log(config_path: Option<&Path>) -> Result<(TimeLog, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create log directory")?;
    }

    let format = TimeFormat::new(&config.time_format).context("invalid time_format")?;
    let log = TimeLog::new(&config.log_path, format);
    Ok((log, config))
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
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();
    match &cli.command {
        Some(Commands::Switch(args)) => {
            let (mut log, config) = open_log(cli.config.as_deref())?;
            switch::run(&mut stdout, &mut log, &config, args)?;
        }
        Some(Commands::Rename { old, new, regex }) => {
            let (mut log, _config) = open_log(cli.config.as_deref())?;
            rename::run(&mut stdout, &mut log, old, new, *regex)?;
        }
        Some(Commands::Print(args)) => {
            let (mut log, config) = open_log(cli.config.as_deref())?;
            print::run(&mut stdout, &mut log, &config, args)?;
        }
        Some(Commands::Current) => {
            let (mut log, _config) = open_log(cli.config.as_deref())?;
            status::current(&mut stdout, &mut log)?;
        }
        Some(Commands::Recent { count }) => {
            let (mut log, _config) = open_log(cli.config.as_deref())?;
            status::recent(&mut stdout, &mut log, *count)?;
        }
        Some(Commands::Config) => {
            // Config doesn't need the log - just shows where it would be
            let config = Config::load_from(cli.config.as_deref())
                .context("failed to load configuration")?;
            writeln!(stdout, "log_path = {}", config.log_path.display())?;
            writeln!(stdout, "time_format = {}", config.time_format)?;
            writeln!(stdout, "short_time_format = {}", config.short_time_format)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
