//! Declarative marker rules for patching version-bearing lines.
//!
//! Dependent artifacts are not structurally parsed — each one carries a
//! small number of fields identified by fixed textual markers. A rule is
//! `{pattern, template}`: the first regex match is replaced by the
//! rendered template, leaving everything else untouched. One uniform
//! routine executes every rule, instead of a bespoke function per file.

use std::path::PathBuf;

use regex::{NoExpand, Regex};

use crate::error::{Result, VersionError};

/// Values available to replacement templates.
///
/// Template placeholders: `{version}`, `{build}`, `{date}`, `{commit}`.
#[derive(Debug, Clone)]
pub struct StampContext {
    /// Semantic version text, e.g. `3.2.0`.
    pub version: String,
    /// Build identifier text: a timestamp or the placeholder token.
    pub build: String,
    /// ISO-8601 UTC build date, e.g. `2025-01-27T00:00:00Z`.
    pub date: String,
    /// Short git commit hash, or `unknown`.
    pub commit: String,
}

impl StampContext {
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{version}", &self.version)
            .replace("{build}", &self.build)
            .replace("{date}", &self.date)
            .replace("{commit}", &self.commit)
    }
}

/// One patchable field: a pattern locating it and a template rewriting it.
#[derive(Debug, Clone)]
pub struct MarkerRule {
    pattern: Regex,
    template: String,
}

impl MarkerRule {
    pub fn new(pattern: &str, template: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|err| VersionError::InvalidMarker {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            pattern,
            template: template.to_string(),
        })
    }

    /// Replace the first match with the rendered template.
    ///
    /// Returns `None` when the marker is absent from the content, so the
    /// caller can report which fields were actually patched.
    pub fn apply(&self, content: &str, ctx: &StampContext) -> Option<String> {
        if !self.pattern.is_match(content) {
            return None;
        }
        let rendered = ctx.render(&self.template);
        Some(
            self.pattern
                .replacen(content, 1, NoExpand(&rendered))
                .into_owned(),
        )
    }
}

/// A dependent artifact: a file plus the marker rules that patch it.
#[derive(Debug, Clone)]
pub struct ArtifactRule {
    /// Path relative to the project root.
    pub rel_path: PathBuf,
    pub markers: Vec<MarkerRule>,
}

impl ArtifactRule {
    pub fn new(rel_path: impl Into<PathBuf>, markers: Vec<MarkerRule>) -> Self {
        Self {
            rel_path: rel_path.into(),
            markers,
        }
    }

    /// Run every marker over the content; `matched` counts the rules that
    /// found their field.
    pub fn apply(&self, content: &str, ctx: &StampContext) -> (String, usize) {
        let mut patched = content.to_string();
        let mut matched = 0;
        for marker in &self.markers {
            if let Some(next) = marker.apply(&patched, ctx) {
                patched = next;
                matched += 1;
            }
        }
        (patched, matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> StampContext {
        StampContext {
            version: "3.3.0".to_string(),
            build: "202502010900".to_string(),
            date: "2025-02-01T09:00:00Z".to_string(),
            commit: "abc1234".to_string(),
        }
    }

    #[test]
    fn render_substitutes_all_placeholders() {
        let out = ctx().render("{version}+{build} built {date} at {commit}");
        assert_eq!(out, "3.3.0+202502010900 built 2025-02-01T09:00:00Z at abc1234");
    }

    #[test]
    fn marker_replaces_only_the_first_match() {
        let rule = MarkerRule::new(
            r"static const String appVersion = '[^']*';",
            "static const String appVersion = '{version}';",
        )
        .unwrap();

        let content = "class AppConfig {\n  static const String appVersion = '3.2.0';\n}\n";
        let patched = rule.apply(content, &ctx()).unwrap();
        assert!(patched.contains("appVersion = '3.3.0'"));
        assert!(!patched.contains("'3.2.0'"));
    }

    #[test]
    fn marker_missing_from_content_returns_none() {
        let rule = MarkerRule::new(r"buildNumber = '[^']*'", "buildNumber = '{build}'").unwrap();
        assert!(rule.apply("// nothing version-shaped here\n", &ctx()).is_none());
    }

    #[test]
    fn replacement_is_literal_not_regex_expanded() {
        // A '$' in the rendered template must not trigger capture expansion.
        let rule = MarkerRule::new(r"V=\S+", "V=${build}").unwrap();
        let mut c = ctx();
        c.build = "99".to_string();
        let patched = rule.apply("V=old", &c).unwrap();
        assert_eq!(patched, "V=$99");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(matches!(
            MarkerRule::new(r"([unclosed", "x"),
            Err(VersionError::InvalidMarker { .. })
        ));
    }

    #[test]
    fn artifact_rule_counts_matched_markers() {
        let rule = ArtifactRule::new(
            "lib/shared/lib/version.dart",
            vec![
                MarkerRule::new(r"version = '[^']*'", "version = '{version}'").unwrap(),
                MarkerRule::new(r"buildDate = '[^']*'", "buildDate = '{date}'").unwrap(),
                MarkerRule::new(r"absentField = \d+", "absentField = 0").unwrap(),
            ],
        );

        let content = "version = '1.0.0'\nbuildDate = 'never'\n";
        let (patched, matched) = rule.apply(content, &ctx());
        assert_eq!(matched, 2);
        assert!(patched.contains("version = '3.3.0'"));
        assert!(patched.contains("buildDate = '2025-02-01T09:00:00Z'"));
    }
}
