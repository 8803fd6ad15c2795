//! The structured JSON version descriptor shipped with the app assets.
//!
//! Unlike marker-patched artifacts, the descriptor is always fully
//! regenerated on propagation: whatever was there before is replaced by a
//! freshly serialized document.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::build_id::FullVersion;
use crate::error::Result;

/// Commit value written when git is unavailable or the project is not a
/// repository.
pub const UNKNOWN_COMMIT: &str = "unknown";

/// Contents of `assets/version.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionDescriptor {
    /// Semantic version, e.g. `3.2.0`.
    pub version: String,
    /// Build identifier: timestamp or placeholder token.
    pub build_number: String,
    /// ISO-8601 UTC instant the descriptor was generated.
    pub build_date: String,
    /// Short git commit hash, or [`UNKNOWN_COMMIT`].
    pub git_commit: String,
}

impl VersionDescriptor {
    pub fn generate(full: &FullVersion, at: DateTime<Utc>, commit: impl Into<String>) -> Self {
        Self {
            version: full.semver.to_string(),
            build_number: full.build.to_string(),
            build_date: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            git_commit: commit.into(),
        }
    }

    /// Pretty-printed JSON document with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}
