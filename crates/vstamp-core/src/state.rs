//! The version state machine: read, transition, and propagate.
//!
//! [`VersionState`] is the single authority over the product version. It
//! re-derives the current version from the manifest on every operation,
//! computes transitions purely, and pushes the result to every dependent
//! artifact in a strictly ordered pass: manifest first (mandatory), then
//! best-effort mirrors.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};

use crate::build_id::{BuildIdentifier, FullVersion};
use crate::config::StampConfig;
use crate::descriptor::VersionDescriptor;
use crate::error::{Result, VersionError};
use crate::git::short_sha_or_unknown;
use crate::manifest::{backup_path_for, Manifest};
use crate::rules::StampContext;
use crate::semver::{IncrementKind, SemanticVersion};

/// An optional mirror that was not updated, and why.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SkippedArtifact {
    pub path: PathBuf,
    pub reason: String,
}

/// Which files a propagation pass touched.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PropagationReport {
    /// The full version every file now reflects.
    pub target: String,
    pub updated: Vec<PathBuf>,
    pub skipped: Vec<SkippedArtifact>,
}

impl PropagationReport {
    pub fn has_warnings(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Single authority for reading, validating, transitioning, and
/// propagating the product version.
pub struct VersionState {
    config: StampConfig,
}

impl VersionState {
    pub fn new(config: StampConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StampConfig {
        &self.config
    }

    fn manifest(&self) -> Manifest {
        Manifest::new(self.config.manifest_abs())
    }

    /// Current full version, re-read from the manifest.
    pub fn read_current(&self) -> Result<FullVersion> {
        self.manifest().read()
    }

    /// Validate a semantic version string without touching any file.
    pub fn validate(text: &str) -> Result<SemanticVersion> {
        SemanticVersion::parse(text)
    }

    /// Compute the next full version for an increment command.
    ///
    /// Major/minor/patch bumps stamp a real timestamp immediately; a pure
    /// build bump defers to the placeholder so the number later reflects
    /// when the artifact was built, not when this command ran.
    pub fn increment_at(&self, kind: IncrementKind, now: DateTime<Utc>) -> Result<FullVersion> {
        let current = self.read_current()?;
        let next = current.semver.increment(kind);
        // Integer arithmetic cannot produce a malformed version, but the
        // result is re-validated before anything is written.
        let next = SemanticVersion::parse(&next.to_string())?;

        let build = match kind {
            IncrementKind::Build => BuildIdentifier::Placeholder,
            _ => BuildIdentifier::timestamp(now),
        };
        Ok(FullVersion::new(next, build))
    }

    pub fn increment(&self, kind: IncrementKind) -> Result<FullVersion> {
        self.increment_at(kind, Utc::now())
    }

    /// Compute the full version for an explicit `set` command.
    ///
    /// Always a concrete timestamp build identifier, never the placeholder.
    pub fn set_at(&self, semver_text: &str, now: DateTime<Utc>) -> Result<FullVersion> {
        let semver = SemanticVersion::parse(semver_text)?;
        Ok(FullVersion::new(semver, BuildIdentifier::timestamp(now)))
    }

    pub fn set(&self, semver_text: &str) -> Result<FullVersion> {
        self.set_at(semver_text, Utc::now())
    }

    /// Resolve a deferred placeholder to a real timestamp.
    ///
    /// Returns `None` when the manifest already carries a concrete build
    /// identifier — injection is a no-op then.
    pub fn inject_at(&self, now: DateTime<Utc>) -> Result<Option<FullVersion>> {
        let current = self.read_current()?;
        if !current.build.is_placeholder() {
            return Ok(None);
        }
        Ok(Some(FullVersion::new(
            current.semver,
            BuildIdentifier::timestamp(now),
        )))
    }

    pub fn inject(&self) -> Result<Option<FullVersion>> {
        self.inject_at(Utc::now())
    }

    /// Packaging guard: fail loudly while the placeholder is unresolved.
    ///
    /// An artifact must never ship with `BUILD_TIME_PLACEHOLDER` still in
    /// its version string.
    pub fn ensure_resolved(&self) -> Result<FullVersion> {
        let current = self.read_current()?;
        if current.build.is_placeholder() {
            return Err(VersionError::UnresolvedPlaceholder);
        }
        Ok(current)
    }

    /// Whether the new version warrants a tagged release (major bump only).
    pub fn release_gate(semver: &SemanticVersion) -> bool {
        semver.is_release_boundary()
    }

    /// Push a new full version to the manifest and every mirror.
    ///
    /// Order is strict: the mandatory manifest write completes before any
    /// optional mirror is attempted, so a crash never leaves the manifest
    /// behind its mirrors. Mirror failures warn and continue; they lag
    /// until the next propagation run. Idempotent for a fixed target.
    pub fn propagate_at(
        &self,
        version: &FullVersion,
        now: DateTime<Utc>,
    ) -> Result<PropagationReport> {
        let manifest = self.manifest();
        manifest.write(version)?;
        info!(version = %version, manifest = %manifest.path().display(), "manifest updated");

        let mut report = PropagationReport {
            target: version.to_string(),
            updated: vec![manifest.path().to_path_buf()],
            skipped: Vec::new(),
        };

        let ctx = StampContext {
            version: version.semver.to_string(),
            build: version.build.to_string(),
            date: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            commit: short_sha_or_unknown(&self.config.project_root),
        };

        for rule in &self.config.artifacts {
            let path = self.config.artifact_abs(rule);
            if !path.exists() {
                warn!(path = %path.display(), "optional artifact missing, skipping");
                report.skipped.push(SkippedArtifact {
                    path,
                    reason: "file not found".to_string(),
                });
                continue;
            }

            match self.patch_artifact(&path, rule, &ctx) {
                Ok(true) => report.updated.push(path),
                Ok(false) => {
                    warn!(path = %path.display(), "no version markers matched, skipping");
                    report.skipped.push(SkippedArtifact {
                        path,
                        reason: "no version markers matched".to_string(),
                    });
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "mirror update failed, continuing");
                    report.skipped.push(SkippedArtifact {
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let descriptor_path = self.config.descriptor_abs();
        match self.regenerate_descriptor(version, now, &ctx.commit) {
            Ok(()) => report.updated.push(descriptor_path),
            Err(err) => {
                warn!(path = %descriptor_path.display(), error = %err, "descriptor regeneration failed, continuing");
                report.skipped.push(SkippedArtifact {
                    path: descriptor_path,
                    reason: err.to_string(),
                });
            }
        }

        info!(
            target = %report.target,
            updated = report.updated.len(),
            skipped = report.skipped.len(),
            "propagation complete"
        );
        Ok(report)
    }

    pub fn propagate(&self, version: &FullVersion) -> Result<PropagationReport> {
        self.propagate_at(version, Utc::now())
    }

    /// Back up and patch one marker-rule artifact. `Ok(false)` means the
    /// file exists but none of its markers matched.
    fn patch_artifact(
        &self,
        path: &std::path::Path,
        rule: &crate::rules::ArtifactRule,
        ctx: &StampContext,
    ) -> Result<bool> {
        let content = fs::read_to_string(path)?;
        let (patched, matched) = rule.apply(&content, ctx);
        if matched == 0 {
            return Ok(false);
        }
        fs::copy(path, backup_path_for(path))?;
        fs::write(path, patched)?;
        Ok(true)
    }

    /// Fully regenerate the JSON descriptor, creating its directory if
    /// needed.
    fn regenerate_descriptor(
        &self,
        version: &FullVersion,
        now: DateTime<Utc>,
        commit: &str,
    ) -> Result<()> {
        let path = self.config.descriptor_abs();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let descriptor = VersionDescriptor::generate(version, now, commit);
        fs::write(&path, descriptor.to_json()?)?;
        Ok(())
    }
}
