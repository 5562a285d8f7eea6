//! Config command - print effective settings, optionally persist them.

use std::path::Path;

use anyhow::Context;

use crate::config::Settings;

/// Run the config command. With `write_to`, the settings are saved there too.
pub fn run(config: &Settings, write_to: Option<&Path>) -> anyhow::Result<()> {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    println!("{}", config.to_toml()?);

    if let Some(path) = write_to {
        config
            .save(path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Cannot write {}", path.display()))?;
        eprintln!("Saved configuration to {}", path.display());
    }
    Ok(())
}
