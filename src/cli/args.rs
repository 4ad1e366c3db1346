//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Artifact stamping watcher
#[derive(Parser)]
#[command(
    name = "sheetstamp",
    version = env!("CARGO_PKG_VERSION"),
    about = "Mirror spreadsheet artifacts and stamp them with the current revision",
    long_about = "Watch a directory tree for spreadsheet artifact updates, mirror each \
                  changed artifact into an output subtree, and write the current \
                  source-control revision into its version worksheet.",
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .sheetstamp directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Watch a directory tree and stamp changed artifacts
    #[command(
        about = "Watch for artifact updates and stamp mirrored copies",
        after_help = "Examples:\n  sheetstamp watch\n  sheetstamp watch /repo\n  RUST_LOG=debug sheetstamp watch"
    )]
    Watch {
        /// Directory to watch (overrides configured watch_root)
        #[arg(value_name = "ROOT")]
        root: Option<PathBuf>,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .sheetstamp/settings.toml")]
    Config,
}
