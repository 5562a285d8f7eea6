//! CLI argument parsing using clap.

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

/// Live directory viewer
#[derive(Parser, Debug)]
#[command(
    name = "dirview",
    version = env!("CARGO_PKG_VERSION"),
    about = "Browse a directory in the browser, live",
    long_about = "Mirror a directory tree into a live-updating web page, serve downloads and write checksum manifests.",
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to a custom dirview.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the live tree over HTTP
    #[command(after_help = "Examples:\n  dirview serve\n  dirview serve --root /srv/mirror --bind 0.0.0.0:8080")]
    Serve {
        /// Directory to mirror (overrides config)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Address to listen on (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Write a SHA-256 manifest for every file under the root
    Sums {
        /// Directory to hash (overrides config)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Manifest path (defaults to <root>/<checksums.file_name>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print one snapshot of the tree
    Tree {
        /// Directory to scan (overrides config)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Print JSON instead of an outline
        #[arg(long)]
        json: bool,
    },

    /// Display active settings
    Config {
        /// Also write them to the config file (`--config` or dirview.toml)
        #[arg(long)]
        write: bool,
    },
}
