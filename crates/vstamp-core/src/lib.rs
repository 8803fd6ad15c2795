//! vstamp core library
//!
//! Single authority for a project's product version: parse and validate
//! the semantic version, derive new values on increment/set commands, and
//! propagate the result to every dependent artifact file — manifest
//! first, mirrors best-effort.

pub mod build_id;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod git;
pub mod manifest;
pub mod rules;
pub mod semver;
pub mod state;
pub mod telemetry;

pub use build_id::{BuildIdentifier, FullVersion, PLACEHOLDER_TOKEN};
pub use config::StampConfig;
pub use descriptor::{VersionDescriptor, UNKNOWN_COMMIT};
pub use error::{Result, VersionError};
pub use git::{capture_short_sha, create_release_tag, is_git_repo, push_tag, short_sha_or_unknown};
pub use manifest::{backup_path_for, Manifest, BACKUP_SUFFIX};
pub use rules::{ArtifactRule, MarkerRule, StampContext};
pub use semver::{IncrementKind, SemanticVersion};
pub use state::{PropagationReport, SkippedArtifact, VersionState};
pub use telemetry::init_tracing;

/// vstamp version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
