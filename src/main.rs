//! fluxgraph - live reconciliation graphs for Flux automations
//!
//! Reads snapshots of the objects a Kustomization or HelmRelease manages and
//! emits positioned draw commands as JSON, either once or on every poll.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::{ConfigSubcommand, RenderArgs, WatchArgs};
use std::path::PathBuf;

/// fluxgraph - live reconciliation graphs for Flux automations
#[derive(Parser, Debug)]
#[command(name = "fluxgraph")]
#[command(about = "Lay out and render the reconciliation graph of a Flux automation", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Render one snapshot as a draw command
    Render(RenderArgs),
    /// Poll a snapshot file and stream draw commands
    Watch(WatchArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging if debug flag is set
    let log_file = cli::init_logging(args.debug)?;

    // Print log file location to stderr so stdout stays machine readable
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    let config_path = args.config.as_deref();
    match args.command {
        Command::Render(render) => cli::handle_render(render, config_path),
        Command::Watch(watch) => cli::handle_watch(watch, config_path).await,
        Command::Config { subcommand } => cli::handle_config_command(subcommand, config_path),
        Command::Version => {
            cli::display_version();
            Ok(())
        }
    }
}
