//! SHA-256 manifest for the mirrored root.
//!
//! The manifest lists one `<hex digest> <relative path>` line per file and
//! lives inside the root it describes, so it is skipped while hashing.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ChecksumError {
    #[error("Could not walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Digest of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    pub digest: String,
    /// `/`-separated, relative to the hashed root.
    pub relative_path: String,
}

impl ChecksumEntry {
    /// Manifest line, without the trailing newline.
    pub fn to_line(&self) -> String {
        format!("{} {}", self.digest, self.relative_path)
    }
}

/// Hex-encoded SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String, ChecksumError> {
    let io_err = |source| ChecksumError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(io_err)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Hash every file under `root` in name order, skipping `skip` if given.
pub fn compute(root: &Path, skip: Option<&Path>) -> Result<Vec<ChecksumEntry>, ChecksumError> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| ChecksumError::Walk {
            path: e.path().unwrap_or(root).to_path_buf(),
            reason: e.to_string(),
        })?;

        if entry.file_type().is_dir() || Some(entry.path()) == skip {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        entries.push(ChecksumEntry {
            digest: sha256_file(entry.path())?,
            relative_path,
        });
    }

    Ok(entries)
}

/// Result of [`write_manifest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSummary {
    pub path: PathBuf,
    pub files: usize,
}

/// Recompute checksums for `root` and write them to `output`.
///
/// The manifest is written in one piece once every file has been hashed.
pub fn write_manifest(root: &Path, output: &Path) -> Result<ManifestSummary, ChecksumError> {
    let entries = compute(root, Some(output))?;

    let mut content = String::new();
    for entry in &entries {
        content.push_str(&entry.to_line());
        content.push('\n');
    }

    std::fs::write(output, content).map_err(|source| ChecksumError::Io {
        path: output.to_path_buf(),
        source,
    })?;

    crate::log_event!(
        "checksums",
        "written",
        "{} files to {}",
        entries.len(),
        output.display()
    );

    Ok(ManifestSummary {
        path: output.to_path_buf(),
        files: entries.len(),
    })
}
