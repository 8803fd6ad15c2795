//! Error taxonomy for version-state operations.

use std::path::PathBuf;

/// Errors produced by version reading, validation, and propagation.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("version manifest not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("version manifest {} is malformed: {reason}", path.display())]
    ManifestMalformed { path: PathBuf, reason: String },

    #[error("invalid semantic version '{input}': {reason}")]
    InvalidFormat { input: String, reason: String },

    #[error("build number is still the deferred placeholder; inject a timestamp before packaging")]
    UnresolvedPlaceholder,

    #[error("invalid marker pattern '{pattern}': {reason}")]
    InvalidMarker { pattern: String, reason: String },

    #[error("git error: {0}")]
    Git(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for version-state operations.
pub type Result<T> = std::result::Result<T, VersionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_not_found_names_the_path() {
        let err = VersionError::ManifestNotFound {
            path: PathBuf::from("/tmp/app/pubspec.yaml"),
        };
        assert!(err.to_string().contains("pubspec.yaml"));
    }

    #[test]
    fn invalid_format_carries_input_and_reason() {
        let err = VersionError::InvalidFormat {
            input: "1.a.3".to_string(),
            reason: "component 'a' is not a number".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1.a.3"));
        assert!(msg.contains("not a number"));
    }

    #[test]
    fn unresolved_placeholder_mentions_injection() {
        let err = VersionError::UnresolvedPlaceholder;
        assert!(err.to_string().contains("placeholder"));
    }
}
