//! The stamping tool holds itself to its own rule: every workspace crate
//! inherits `version.workspace = true`, and the workspace version matches
//! the compiled `CARGO_PKG_VERSION`.

use std::path::Path;

fn workspace_root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("crate lives two levels below the workspace root")
}

fn workspace_version() -> String {
    let root_toml = std::fs::read_to_string(workspace_root().join("Cargo.toml")).unwrap();
    let doc: toml::Value = root_toml.parse().unwrap();
    doc["workspace"]["package"]["version"]
        .as_str()
        .unwrap()
        .to_string()
}

#[test]
fn all_crates_inherit_the_workspace_version() {
    for krate in ["crates/vstamp-core", "crates/vstamp-cli"] {
        let manifest = workspace_root().join(krate).join("Cargo.toml");
        let doc: toml::Value = std::fs::read_to_string(&manifest)
            .unwrap()
            .parse()
            .unwrap();
        let inherits = doc["package"]["version"]
            .as_table()
            .and_then(|t| t.get("workspace"))
            .and_then(toml::Value::as_bool)
            == Some(true);
        assert!(
            inherits,
            "{krate} must use version.workspace = true"
        );
    }
}

#[test]
fn workspace_version_matches_cargo_pkg() {
    assert_eq!(workspace_version(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn workspace_version_passes_our_own_validator() {
    let version = workspace_version();
    assert!(
        vstamp_core::SemanticVersion::parse(&version).is_ok(),
        "workspace version {version} fails vstamp's own format rule"
    );
}
