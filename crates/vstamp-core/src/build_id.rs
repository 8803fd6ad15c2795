//! Build identifiers and the composed full version string.
//!
//! A build identifier distinguishes individual builds of the same semantic
//! version. Semantic bumps and explicit `set` commands get a real
//! 12-digit `YYYYMMDDHHMM` UTC timestamp immediately; a pure build bump
//! writes the deferred placeholder token instead, to be resolved by a
//! separate injection pass at actual build time.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::semver::SemanticVersion;

/// Literal token meaning "build number not yet assigned".
pub const PLACEHOLDER_TOKEN: &str = "BUILD_TIME_PLACEHOLDER";

/// Format string for concrete build timestamps (12 digits, UTC).
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

/// The build tag appended after `+` in a full version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildIdentifier {
    /// Deferred-injection placeholder, rendered as [`PLACEHOLDER_TOKEN`].
    Placeholder,
    /// A concrete tag: usually a `YYYYMMDDHHMM` timestamp, but legacy
    /// manifests may carry plain counters like `1`.
    Tag(String),
}

impl BuildIdentifier {
    /// Interpret the text after the `+` separator.
    pub fn parse(text: &str) -> Self {
        if text == PLACEHOLDER_TOKEN {
            Self::Placeholder
        } else {
            Self::Tag(text.to_string())
        }
    }

    /// A fresh concrete timestamp identifier for the given instant.
    pub fn timestamp(at: DateTime<Utc>) -> Self {
        Self::Tag(at.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// Whether this is a concrete 12-digit timestamp tag.
    pub fn is_timestamp(&self) -> bool {
        match self {
            Self::Placeholder => false,
            Self::Tag(tag) => tag.len() == 12 && tag.bytes().all(|b| b.is_ascii_digit()),
        }
    }
}

impl fmt::Display for BuildIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placeholder => f.write_str(PLACEHOLDER_TOKEN),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// The composed `{semver}+{build}` string held by the manifest.
///
/// Derived, never stored independently; only ever split at the first `+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullVersion {
    pub semver: SemanticVersion,
    pub build: BuildIdentifier,
}

impl FullVersion {
    pub fn new(semver: SemanticVersion, build: BuildIdentifier) -> Self {
        Self { semver, build }
    }

    /// Split a manifest version value at the first `+`.
    ///
    /// A missing build side defaults to `1`, matching manifests written
    /// before build stamping existed.
    pub fn parse(text: &str) -> Result<Self> {
        let (semver_text, build_text) = match text.split_once('+') {
            Some((left, right)) => (left, right),
            None => (text, "1"),
        };
        Ok(Self {
            semver: SemanticVersion::parse(semver_text)?,
            build: BuildIdentifier::parse(build_text),
        })
    }
}

impl fmt::Display for FullVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.semver, self.build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_is_twelve_digits() {
        let at = Utc.with_ymd_and_hms(2025, 1, 27, 12, 34, 56).unwrap();
        let id = BuildIdentifier::timestamp(at);
        assert_eq!(id.to_string(), "202501271234");
        assert!(id.is_timestamp());
        assert!(!id.is_placeholder());
    }

    #[test]
    fn placeholder_round_trips_through_text() {
        let id = BuildIdentifier::parse(PLACEHOLDER_TOKEN);
        assert!(id.is_placeholder());
        assert!(!id.is_timestamp());
        assert_eq!(id.to_string(), PLACEHOLDER_TOKEN);
    }

    #[test]
    fn legacy_counter_is_a_plain_tag() {
        let id = BuildIdentifier::parse("1");
        assert_eq!(id, BuildIdentifier::Tag("1".to_string()));
        assert!(!id.is_timestamp());
    }

    #[test]
    fn full_version_splits_at_first_plus() {
        let v = FullVersion::parse("3.2.0+202501271234").unwrap();
        assert_eq!(v.semver.to_string(), "3.2.0");
        assert_eq!(v.build.to_string(), "202501271234");
        assert_eq!(v.to_string(), "3.2.0+202501271234");
    }

    #[test]
    fn full_version_without_build_defaults_to_one() {
        let v = FullVersion::parse("3.2.0").unwrap();
        assert_eq!(v.build, BuildIdentifier::Tag("1".to_string()));
        assert_eq!(v.to_string(), "3.2.0+1");
    }

    #[test]
    fn full_version_rejects_bad_semver_side() {
        assert!(FullVersion::parse("3.2+99").is_err());
        assert!(FullVersion::parse("a.b.c+1").is_err());
    }
}
