use std::path::PathBuf;

use clap::Parser;

use dirview::Settings;
use dirview::cli::commands::{self, serve::ServeArgs, sums::SumsArgs, tree::TreeArgs};
use dirview::cli::{Cli, Commands};
use dirview::config::DEFAULT_CONFIG_FILE;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    dirview::logging::init(&config.logging);

    let result = match cli.command {
        Commands::Serve { root, bind } => {
            commands::serve::run(ServeArgs { root, bind }, config).await
        }
        Commands::Sums { root, output } => commands::sums::run(SumsArgs { root, output }, &config),
        Commands::Tree { root, json } => commands::tree::run(TreeArgs { root, json }, &config),
        Commands::Config { write } => {
            let target = write.then(|| {
                cli.config
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
            });
            commands::config::run(&config, target.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
