//! CLI command implementations.

pub mod config;
pub mod expand;
pub mod manifest;
pub mod style;

use clap::{Args, Subcommand};

/// Arguments for the expand command.
#[derive(Args)]
pub struct ExpandArgs {
    /// Delimited path list, as written in a step tag's `src` attribute.
    pub paths: String,

    /// Print a complete document (with the style block) instead of the
    /// container alone.
    #[arg(long)]
    pub document: bool,

    /// Override the path delimiter.
    #[arg(short, long)]
    pub split: Option<String>,
}

/// Arguments for the style command.
#[derive(Args)]
pub struct StyleArgs {
    /// Wrap the rules in a `<style>` element.
    #[arg(long)]
    pub element: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}

/// Arguments for the manifest command.
#[derive(Args)]
pub struct ManifestArgs {
    #[command(subcommand)]
    pub command: ManifestCommand,
}

#[derive(Subcommand)]
pub enum ManifestCommand {
    /// List manifest entries resolved against the origin.
    List,
    /// Verify every manifest entry exists in a deployed asset directory.
    Check {
        /// Root directory of the deployed site.
        #[arg(short, long, default_value = ".")]
        root: String,
    },
}
