//! The canonical version manifest and its single-slot backup.
//!
//! The manifest is the one file that owns the full version string; every
//! other file is a downstream mirror. Rewrites touch only the `version:`
//! declaration line and preserve all other lines verbatim, after copying
//! the previous content to a fixed backup slot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::build_id::FullVersion;
use crate::error::{Result, VersionError};

/// Suffix appended to the manifest file name for the backup slot.
/// Only the immediately prior state is recoverable; each mutation
/// overwrites the previous backup.
pub const BACKUP_SUFFIX: &str = ".backup";

const VERSION_KEY: &str = "version:";

/// Handle on the canonical manifest file.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        backup_path_for(&self.path)
    }

    /// Read and parse the manifest's version declaration.
    pub fn read(&self) -> Result<FullVersion> {
        let content = self.read_content()?;
        let value = find_version_value(&content).ok_or_else(|| VersionError::ManifestMalformed {
            path: self.path.clone(),
            reason: "no 'version:' declaration found".to_string(),
        })?;
        FullVersion::parse(value)
    }

    /// Rewrite the version declaration in place, preserving every other
    /// line. Backs up the previous content first. Fatal on failure — the
    /// manifest must never be left inconsistent with itself.
    pub fn write(&self, version: &FullVersion) -> Result<()> {
        let content = self.read_content()?;
        if find_version_value(&content).is_none() {
            return Err(VersionError::ManifestMalformed {
                path: self.path.clone(),
                reason: "no 'version:' declaration found".to_string(),
            });
        }

        fs::copy(&self.path, self.backup_path())?;
        debug!(backup = %self.backup_path().display(), "manifest backed up");

        // Splice only the version line; every other byte, including each
        // line's own terminator (LF or CRLF), passes through verbatim.
        let mut rewritten = String::with_capacity(content.len());
        let mut replaced = false;
        for segment in content.split_inclusive('\n') {
            let line = segment
                .strip_suffix("\r\n")
                .or_else(|| segment.strip_suffix('\n'))
                .unwrap_or(segment);
            if !replaced && line.trim_start().starts_with(VERSION_KEY) {
                let indent = &line[..line.len() - line.trim_start().len()];
                let terminator = &segment[line.len()..];
                rewritten.push_str(indent);
                rewritten.push_str(VERSION_KEY);
                rewritten.push(' ');
                rewritten.push_str(&version.to_string());
                rewritten.push_str(terminator);
                replaced = true;
            } else {
                rewritten.push_str(segment);
            }
        }

        fs::write(&self.path, rewritten)?;
        Ok(())
    }

    fn read_content(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(VersionError::ManifestNotFound {
                    path: self.path.clone(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Backup slot path for any propagated file.
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// First `version:` declaration value in the file, if any.
fn find_version_value(content: &str) -> Option<&str> {
    content.lines().find_map(|line| {
        line.trim_start()
            .strip_prefix(VERSION_KEY)
            .map(|rest| rest.trim())
    })
}
