//! vsc CLI
//!
//! Downloads editor extensions from the marketplace or GitHub releases,
//! optionally running every network command on a remote host over SSH.

mod cli;
mod commands;
mod context;
mod error;
mod settings;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use context::AppContext;
use error::Result;
use settings::{Settings, SettingsLoader};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command.clone() else {
        println!("{} editor extension installer", "vsc".green().bold());
        println!();
        println!("Run {} for available commands.", "vsc --help".cyan());
        return Ok(());
    };

    let settings = load_settings(&cli)?;
    let ctx = AppContext::from_settings(&settings)?;
    commands::execute(command, &ctx)
}

/// Log to stderr. `RUST_LOG` wins over the default directives.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default_directives =
        format!("warn,vsc={level},vsc_extensions={level},vsc_tunnel={level}");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("Verbose mode enabled");
}

/// Settings files, then global flags and their `VSC_*` variables.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    let mut loader = SettingsLoader::new(cwd);
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let mut settings = loader.resolve()?;

    settings.merge(Settings {
        remote_host: cli.host.clone(),
        gateway: cli.gateway.clone(),
        platform: cli.platform.clone(),
        ..Settings::default()
    });
    Ok(settings)
}
