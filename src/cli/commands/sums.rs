//! Sums command - write the checksum manifest.

use std::path::PathBuf;

use crate::checksums;
use crate::config::Settings;

/// Arguments for the sums command.
pub struct SumsArgs {
    pub root: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Run the sums command.
pub fn run(args: SumsArgs, config: &Settings) -> anyhow::Result<()> {
    let root = args.root.unwrap_or_else(|| config.root.clone());
    let output = args
        .output
        .unwrap_or_else(|| root.join(&config.checksums.file_name));

    let summary = checksums::write_manifest(&root, &output)?;
    println!(
        "Wrote {} checksums to {}",
        summary.files,
        summary.path.display()
    );
    Ok(())
}
