//! Steps CLI - Command line tool for the step image parser.
//!
//! Commands:
//! - `steps expand` - Expand a path list into step markup
//! - `steps style` - Print the injected style block
//! - `steps config` - Manage configuration
//! - `steps manifest` - Inspect and verify the offline cache manifest

mod commands;
mod config;
mod context;
mod fetcher;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, ExpandArgs, ManifestArgs, StyleArgs};

/// Steps CLI - Expand step tags and manage the offline asset cache
#[derive(Parser)]
#[command(name = "steps")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a delimited path list into step markup
    Expand(ExpandArgs),

    /// Print the style block injected for the configured classes
    Style(StyleArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Inspect and verify the offline cache manifest
    Manifest(ManifestArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Expand(args) => commands::expand::run(args, &ctx).await,
        Commands::Style(args) => commands::style::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
        Commands::Manifest(args) => commands::manifest::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
