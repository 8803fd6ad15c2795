//! Git integration: commit-hash capture and release tagging.
//!
//! All lookups shell out to `git` synchronously. Hash capture is
//! best-effort for stamping purposes (callers substitute `unknown`);
//! tag creation is an explicit, caller-driven step and surfaces errors.

use std::path::Path;
use std::process::Command;

use tracing::warn;

use crate::descriptor::UNKNOWN_COMMIT;
use crate::error::{Result, VersionError};

/// Capture the short HEAD commit hash of the repository at `repo_dir`.
///
/// Runs `git rev-parse --short HEAD`. Errors if git is missing, the
/// directory is not inside a repository, or the output is empty.
pub fn capture_short_sha(repo_dir: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .current_dir(repo_dir)
        .output()
        .map_err(|e| VersionError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VersionError::Git(format!(
            "git rev-parse --short HEAD failed: {stderr}"
        )));
    }

    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if sha.is_empty() {
        return Err(VersionError::Git(
            "git rev-parse returned empty output".to_string(),
        ));
    }

    Ok(sha)
}

/// Short HEAD hash, or [`UNKNOWN_COMMIT`] when capture fails.
///
/// Unavailable git is a recoverable condition during stamping: the
/// descriptor records `unknown` and propagation continues.
pub fn short_sha_or_unknown(repo_dir: &Path) -> String {
    match capture_short_sha(repo_dir) {
        Ok(sha) => sha,
        Err(err) => {
            warn!(error = %err, "git commit hash unavailable, recording 'unknown'");
            UNKNOWN_COMMIT.to_string()
        }
    }
}

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Create an annotated release tag in the repository at `repo_dir`.
pub fn create_release_tag(repo_dir: &Path, tag: &str, message: &str) -> Result<()> {
    let output = Command::new("git")
        .args(["tag", "-a", tag, "-m", message])
        .current_dir(repo_dir)
        .output()
        .map_err(|e| VersionError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VersionError::Git(format!(
            "git tag {tag} failed: {stderr}"
        )));
    }
    Ok(())
}

/// Push a tag to the given remote.
pub fn push_tag(repo_dir: &Path, remote: &str, tag: &str) -> Result<()> {
    let output = Command::new("git")
        .args(["push", remote, tag])
        .current_dir(repo_dir)
        .output()
        .map_err(|e| VersionError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VersionError::Git(format!(
            "git push {remote} {tag} failed: {stderr}"
        )));
    }
    Ok(())
}
