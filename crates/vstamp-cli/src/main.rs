//! vstamp - release version stamping CLI
//!
//! One canonical manifest owns the product version; every other file that
//! embeds a copy is a mirror kept in sync by propagation.
//!
//! ## Commands
//!
//! - `get` / `get-semantic` / `get-build`: print version components
//! - `info`: version, build identifier, and manifest path
//! - `increment`: bump major/minor/patch/build and propagate
//! - `set`: write an explicit semantic version and propagate
//! - `validate`: format-check the current semantic version
//! - `inject`: resolve a deferred build-number placeholder
//! - `check`: packaging guard against unresolved placeholders
//! - `tag`: create (and optionally push) the annotated release tag

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{warn, Level};

use vstamp_core::{
    FullVersion, IncrementKind, PropagationReport, StampConfig, VersionState,
};

#[derive(Parser)]
#[command(name = "vstamp")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Stamp one product version across every release artifact", long_about = None)]
struct Cli {
    /// Project root containing the version manifest
    #[arg(long, global = true, default_value = ".")]
    project_root: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON command output and JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full version (semantic version + build identifier)
    Get,

    /// Print the semantic version only
    GetSemantic,

    /// Print the build identifier only
    GetBuild,

    /// Print version components and the manifest path
    Info,

    /// Bump a version component and propagate to every artifact
    Increment {
        /// Which component to bump
        #[arg(value_enum)]
        kind: BumpKind,
    },

    /// Set an explicit semantic version and propagate
    Set {
        /// Target version, e.g. 3.1.0
        version: String,
    },

    /// Format-check the current semantic version; exit status reports pass/fail
    Validate,

    /// Resolve a deferred build-number placeholder to the current timestamp
    Inject,

    /// Packaging guard: fail while the build number is still a placeholder
    Check,

    /// Create the annotated release tag (vX.Y.Z) for the current version
    Tag {
        /// Push the tag after creating it
        #[arg(long)]
        push: bool,

        /// Remote to push the tag to
        #[arg(long, default_value = "origin")]
        remote: String,
    },
}

/// CLI spelling of the increment kinds.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum BumpKind {
    Major,
    Minor,
    Patch,
    Build,
}

impl From<BumpKind> for IncrementKind {
    fn from(kind: BumpKind) -> Self {
        match kind {
            BumpKind::Major => IncrementKind::Major,
            BumpKind::Minor => IncrementKind::Minor,
            BumpKind::Patch => IncrementKind::Patch,
            BumpKind::Build => IncrementKind::Build,
        }
    }
}

/// Machine-readable shape of `info` output.
#[derive(Serialize)]
struct InfoOutput {
    version: String,
    semantic_version: String,
    build_number: String,
    manifest: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    vstamp_core::init_tracing(cli.json, level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = StampConfig::for_root(&cli.project_root)
        .context("failed to build stamping configuration")?;
    let state = VersionState::new(config);

    match cli.command {
        Commands::Get => cmd_get(&state),
        Commands::GetSemantic => cmd_get_semantic(&state),
        Commands::GetBuild => cmd_get_build(&state),
        Commands::Info => cmd_info(&state, cli.json),
        Commands::Increment { kind } => cmd_increment(&state, kind.into(), cli.json),
        Commands::Set { version } => cmd_set(&state, &version, cli.json),
        Commands::Validate => cmd_validate(&state),
        Commands::Inject => cmd_inject(&state, cli.json),
        Commands::Check => cmd_check(&state),
        Commands::Tag { push, remote } => cmd_tag(&state, push, &remote),
    }
}

fn cmd_get(state: &VersionState) -> Result<()> {
    let current = state.read_current()?;
    println!("{current}");
    Ok(())
}

fn cmd_get_semantic(state: &VersionState) -> Result<()> {
    let current = state.read_current()?;
    println!("{}", current.semver);
    Ok(())
}

fn cmd_get_build(state: &VersionState) -> Result<()> {
    let current = state.read_current()?;
    println!("{}", current.build);
    Ok(())
}

fn cmd_info(state: &VersionState, json: bool) -> Result<()> {
    let current = state.read_current()?;
    print_info(state, &current, json)
}

fn print_info(state: &VersionState, version: &FullVersion, json: bool) -> Result<()> {
    if json {
        let output = InfoOutput {
            version: version.to_string(),
            semantic_version: version.semver.to_string(),
            build_number: version.build.to_string(),
            manifest: state.config().manifest_abs(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Version:   {version}");
        println!("Semantic:  {}", version.semver);
        println!("Build:     {}", version.build);
        println!("Manifest:  {}", state.config().manifest_abs().display());
    }
    Ok(())
}

fn cmd_increment(state: &VersionState, kind: IncrementKind, json: bool) -> Result<()> {
    let now = Utc::now();
    let next = state.increment_at(kind, now)?;
    let report = state.propagate_at(&next, now)?;
    report_skips(&report);
    print_info(state, &next, json)?;

    if VersionState::release_gate(&next.semver) {
        if json {
            tracing::info!(version = %next.semver, "major release boundary, tagging advised");
        } else {
            println!();
            println!(
                "Major release boundary reached: consider tagging with 'vstamp tag' (creates v{})",
                next.semver
            );
        }
    }
    Ok(())
}

fn cmd_set(state: &VersionState, version: &str, json: bool) -> Result<()> {
    let now = Utc::now();
    let next = state.set_at(version, now)?;
    let report = state.propagate_at(&next, now)?;
    report_skips(&report);
    print_info(state, &next, json)
}

fn cmd_validate(state: &VersionState) -> Result<()> {
    let current = state.read_current()?;
    // read_current already validated the semantic portion; run it through
    // the validator once more against its canonical text form.
    let semver = VersionState::validate(&current.semver.to_string())?;
    println!("{semver} is a valid semantic version");
    Ok(())
}

fn cmd_inject(state: &VersionState, json: bool) -> Result<()> {
    let now = Utc::now();
    match state.inject_at(now)? {
        Some(resolved) => {
            let report = state.propagate_at(&resolved, now)?;
            report_skips(&report);
            print_info(state, &resolved, json)
        }
        None => {
            let current = state.read_current()?;
            println!("build number already concrete, nothing to inject");
            print_info(state, &current, json)
        }
    }
}

fn cmd_check(state: &VersionState) -> Result<()> {
    let current = state
        .ensure_resolved()
        .context("packaging guard failed")?;
    println!("{current} is ready for packaging");
    Ok(())
}

fn cmd_tag(state: &VersionState, push: bool, remote: &str) -> Result<()> {
    // Never tag an unresolved placeholder.
    let current = state.ensure_resolved()?;
    let root = &state.config().project_root;
    if !vstamp_core::is_git_repo(root) {
        anyhow::bail!("{} is not inside a git work tree", root.display());
    }

    let tag = format!("v{}", current.semver);
    let message = format!("Release {tag}");
    vstamp_core::create_release_tag(root, &tag, &message)
        .with_context(|| format!("failed to create tag {tag}"))?;
    println!("Created tag {tag}");

    if push {
        vstamp_core::push_tag(root, remote, &tag)
            .with_context(|| format!("failed to push {tag} to {remote}"))?;
        println!("Pushed {tag} to {remote}");
    }
    Ok(())
}

/// Skipped optional mirrors are warnings, never failures.
fn report_skips(report: &PropagationReport) {
    for skipped in &report.skipped {
        warn!(
            path = %skipped.path.display(),
            reason = %skipped.reason,
            "artifact not updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn scaffold(version_line: &str) -> (tempfile::TempDir, VersionState) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("pubspec.yaml"),
            format!("name: app\n{version_line}\n"),
        )
        .unwrap();
        let state = VersionState::new(StampConfig::for_root(dir.path()).unwrap());
        (dir, state)
    }

    fn manifest_content(root: &Path) -> String {
        fs::read_to_string(root.join("pubspec.yaml")).unwrap()
    }

    #[test]
    fn get_commands_read_without_mutating() {
        let (dir, state) = scaffold("version: 3.2.0+202501271234");
        cmd_get(&state).unwrap();
        cmd_get_semantic(&state).unwrap();
        cmd_get_build(&state).unwrap();
        cmd_info(&state, false).unwrap();
        cmd_info(&state, true).unwrap();
        assert!(manifest_content(dir.path()).contains("version: 3.2.0+202501271234"));
        assert!(!dir.path().join("pubspec.yaml.backup").exists());
    }

    #[test]
    fn increment_patch_updates_the_manifest() {
        let (dir, state) = scaffold("version: 1.2.3+1");
        cmd_increment(&state, IncrementKind::Patch, false).unwrap();

        let current = state.read_current().unwrap();
        assert_eq!(current.semver.to_string(), "1.2.4");
        assert!(current.build.is_timestamp());
        assert!(dir.path().join("pubspec.yaml.backup").exists());
    }

    #[test]
    fn increment_build_leaves_a_placeholder_then_check_fails() {
        let (_dir, state) = scaffold("version: 1.2.3+1");
        cmd_increment(&state, IncrementKind::Build, false).unwrap();

        let current = state.read_current().unwrap();
        assert!(current.build.is_placeholder());
        assert!(cmd_check(&state).is_err());

        cmd_inject(&state, false).unwrap();
        assert!(cmd_check(&state).is_ok());
        assert!(state.read_current().unwrap().build.is_timestamp());
    }

    #[test]
    fn set_writes_the_requested_version() {
        let (_dir, state) = scaffold("version: 1.0.0+1");
        cmd_set(&state, "3.1.0", false).unwrap();
        assert_eq!(state.read_current().unwrap().semver.to_string(), "3.1.0");
    }

    #[test]
    fn set_rejects_malformed_versions() {
        let (dir, state) = scaffold("version: 1.0.0+1");
        assert!(cmd_set(&state, "3.1", false).is_err());
        assert!(cmd_set(&state, "a.b.c", false).is_err());
        // Untouched on failure.
        assert!(manifest_content(dir.path()).contains("version: 1.0.0+1"));
    }

    #[test]
    fn validate_passes_on_a_well_formed_manifest() {
        let (_dir, state) = scaffold("version: 2.4.6+42");
        assert!(cmd_validate(&state).is_ok());
    }

    #[test]
    fn commands_fail_cleanly_without_a_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let state = VersionState::new(StampConfig::for_root(dir.path()).unwrap());
        assert!(cmd_get(&state).is_err());
        assert!(cmd_validate(&state).is_err());
        assert!(cmd_increment(&state, IncrementKind::Minor, false).is_err());
    }

    #[test]
    fn release_gate_advises_only_on_major_boundaries() {
        let (_dir, state) = scaffold("version: 1.9.3+1");
        let next = state.increment(IncrementKind::Major).unwrap();
        assert!(VersionState::release_gate(&next.semver));

        let minor = state.increment(IncrementKind::Minor).unwrap();
        assert!(!VersionState::release_gate(&minor.semver));
    }

    #[test]
    fn tag_refuses_an_unresolved_placeholder() {
        let (_dir, state) = scaffold("version: 2.0.0+BUILD_TIME_PLACEHOLDER");
        assert!(cmd_tag(&state, false, "origin").is_err());
    }

    #[test]
    fn tag_refuses_to_run_outside_a_git_repo() {
        let (_dir, state) = scaffold("version: 2.0.0+202501010000");
        let err = cmd_tag(&state, false, "origin").unwrap_err();
        assert!(format!("{err:#}").contains("git work tree"));
    }
}
