//! Explicit stamping configuration.
//!
//! Everything the version state touches is named here — project root,
//! manifest path, dependent-artifact descriptors — and passed in at
//! construction instead of living in ambient globals.

use std::path::PathBuf;

use crate::error::Result;
use crate::rules::{ArtifactRule, MarkerRule};

/// Paths and artifact descriptors for one project.
#[derive(Debug, Clone)]
pub struct StampConfig {
    /// Root of the stamped project (also the git work tree for metadata).
    pub project_root: PathBuf,
    /// Canonical manifest, relative to the root.
    pub manifest_path: PathBuf,
    /// Regenerated JSON descriptor, relative to the root.
    pub descriptor_path: PathBuf,
    /// Marker-patched mirrors, relative to the root. Each is optional at
    /// propagation time.
    pub artifacts: Vec<ArtifactRule>,
}

impl StampConfig {
    /// The standard project layout: one `pubspec.yaml` manifest, an app
    /// config constant, a shared version constants file, a secondary
    /// manifest, and the regenerated `assets/version.json` descriptor.
    pub fn for_root(project_root: impl Into<PathBuf>) -> Result<Self> {
        let app_config = ArtifactRule::new(
            "lib/config/app_config.dart",
            vec![MarkerRule::new(
                r"static const String appVersion = '[^']*';",
                "static const String appVersion = '{version}';",
            )?],
        );

        let shared_version = ArtifactRule::new(
            "lib/shared/lib/version.dart",
            vec![
                MarkerRule::new(
                    r"static const String mainAppVersion = '[^']*';",
                    "static const String mainAppVersion = '{version}';",
                )?,
                MarkerRule::new(
                    r"static const String buildNumber = '[^']*';",
                    "static const String buildNumber = '{build}';",
                )?,
                MarkerRule::new(
                    r"static const String buildDate = '[^']*';",
                    "static const String buildDate = '{date}';",
                )?,
            ],
        );

        let shared_manifest = ArtifactRule::new(
            "lib/shared/pubspec.yaml",
            // CRLF mode: `$` must also match before `\r\n` so the rule
            // works on mirrors written by Windows tooling.
            vec![MarkerRule::new(
                r"(?mR)^version:\s*\S+$",
                "version: {version}+{build}",
            )?],
        );

        Ok(Self {
            project_root: project_root.into(),
            manifest_path: PathBuf::from("pubspec.yaml"),
            descriptor_path: PathBuf::from("assets/version.json"),
            artifacts: vec![app_config, shared_version, shared_manifest],
        })
    }

    pub fn manifest_abs(&self) -> PathBuf {
        self.project_root.join(&self.manifest_path)
    }

    pub fn descriptor_abs(&self) -> PathBuf {
        self.project_root.join(&self.descriptor_path)
    }

    pub fn artifact_abs(&self, rule: &ArtifactRule) -> PathBuf {
        self.project_root.join(&rule.rel_path)
    }
}

impl StampConfig {
    /// Replace the artifact list, e.g. for projects with a custom layout.
    pub fn with_artifacts(mut self, artifacts: Vec<ArtifactRule>) -> Self {
        self.artifacts = artifacts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_has_three_mirrors() {
        let config = StampConfig::for_root("/tmp/project").unwrap();
        assert_eq!(config.artifacts.len(), 3);
        assert_eq!(
            config.manifest_abs(),
            PathBuf::from("/tmp/project/pubspec.yaml")
        );
        assert_eq!(
            config.descriptor_abs(),
            PathBuf::from("/tmp/project/assets/version.json")
        );
    }

    #[test]
    fn with_artifacts_overrides_the_list() {
        let config = StampConfig::for_root("/tmp/project")
            .unwrap()
            .with_artifacts(vec![]);
        assert!(config.artifacts.is_empty());
    }
}
