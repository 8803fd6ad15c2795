//! Semantic version parsing, validation, and increment transitions.
//!
//! The textual form is exactly `major.minor.patch`: three non-negative
//! integer components, no leading zeros beyond `0` itself, nothing else.
//! A version is never cached across invocations — every command re-derives
//! it from the manifest, so parsing here is the single validation gate.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VersionError};

/// A `major.minor.patch` triple identifying a release's compatibility level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// Which component an increment command bumps.
///
/// `Build` leaves the semantic version untouched; only the build
/// identifier changes (see [`crate::build_id::BuildIdentifier`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementKind {
    Major,
    Minor,
    Patch,
    Build,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse and validate a `major.minor.patch` string.
    ///
    /// Rejects empty components, non-numeric components, fewer or more
    /// than three components, and leading zeros (`01.2.3`).
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: String| VersionError::InvalidFormat {
            input: text.to_string(),
            reason,
        };

        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid(format!(
                "expected 3 dot-separated components, found {}",
                parts.len()
            )));
        }

        let mut components = [0u64; 3];
        for (idx, part) in parts.iter().enumerate() {
            if part.is_empty() {
                return Err(invalid(format!("component {} is empty", idx + 1)));
            }
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(format!("component '{part}' is not a number")));
            }
            if part.len() > 1 && part.starts_with('0') {
                return Err(invalid(format!("component '{part}' has a leading zero")));
            }
            components[idx] = part
                .parse::<u64>()
                .map_err(|_| invalid(format!("component '{part}' is out of range")))?;
        }

        Ok(Self {
            major: components[0],
            minor: components[1],
            patch: components[2],
        })
    }

    /// Pure increment transition.
    ///
    /// Major resets minor and patch, minor resets patch, patch bumps in
    /// place, and a build increment changes nothing here.
    pub fn increment(self, kind: IncrementKind) -> Self {
        match kind {
            IncrementKind::Major => Self::new(self.major + 1, 0, 0),
            IncrementKind::Minor => Self::new(self.major, self.minor + 1, 0),
            IncrementKind::Patch => Self::new(self.major, self.minor, self.patch + 1),
            IncrementKind::Build => self,
        }
    }

    /// Whether this version sits on a major release boundary (`X.0.0`).
    ///
    /// The release gate: a tagged release is warranted only here. Advisory
    /// output — tag creation is always a separate, explicit step.
    pub fn is_release_boundary(&self) -> bool {
        self.minor == 0 && self.patch == 0
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
