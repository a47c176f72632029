//! Manifest discovery and parsing (spec §4.4).
//!
//! A manifest declares dependencies, optional environment variables, and
//! optional service auto-start. We recognize several filenames in the
//! project root and in `~/.dotfiles`, and tolerate partially-valid content:
//! an empty `dependencies:` is valid and resolves to no packages, and
//! malformed YAML is a recoverable warning rather than a hard failure.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Filenames recognized as manifests, in the order we look for them.
pub const RECOGNIZED_FILENAMES: &[&str] = &[
    "deps.yaml",
    "deps.yml",
    "dependencies.yaml",
    "dependencies.yml",
    "pkgx.yaml",
    "pkgx.yml",
    "launchpad.yaml",
    "launchpad.yml",
];

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed YAML in {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A dependency entry can be a bare constraint string, or an extended form
/// carrying an explicit `version` and a per-package `global` override.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DependencyEntryRaw {
    Simple(String),
    Extended {
        version: Option<String>,
        global: Option<bool>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct ServicesSectionRaw {
    #[serde(default)]
    enabled: bool,
    #[serde(default, rename = "autoStart")]
    auto_start: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, DependencyEntryRaw>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(default)]
    services: ServicesSectionRaw,
    #[serde(default)]
    global: bool,
}

/// One dependency, normalized to a domain/constraint pair plus its
/// effective `global` flag (inherited from the file-scope default unless
/// overridden per-package).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDependency {
    pub domain: String,
    pub constraint: Option<String>,
    pub global: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicesConfig {
    pub enabled: bool,
    pub auto_start: Vec<String>,
}

/// The normalized, typed contents of a manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub dependencies: Vec<ManifestDependency>,
    pub env: BTreeMap<String, String>,
    pub services: ServicesConfig,
}

/// Parse manifest YAML text. Never fails on an empty `dependencies:` — a
/// missing section is treated the same as an empty one.
pub fn parse(contents: &str, path: &Path) -> Result<Manifest, ManifestError> {
    let raw: RawManifest = serde_yaml::from_str(contents).map_err(|source| ManifestError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    let dependencies = raw
        .dependencies
        .into_iter()
        .map(|(domain, entry)| match entry {
            DependencyEntryRaw::Simple(constraint) => ManifestDependency {
                domain,
                constraint: Some(constraint),
                global: raw.global,
            },
            DependencyEntryRaw::Extended { version, global } => ManifestDependency {
                domain,
                constraint: version,
                global: global.unwrap_or(raw.global),
            },
        })
        .collect();

    Ok(Manifest {
        dependencies,
        env: raw.env,
        services: ServicesConfig {
            enabled: raw.services.enabled,
            auto_start: raw.services.auto_start,
        },
    })
}

/// Load and parse a manifest from disk.
pub fn load(path: &Path) -> Result<Manifest, ManifestError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, path)
}

/// Load a manifest, downgrading a parse failure to a `None` plus a logged
/// warning instead of propagating the error — manifests are user-authored
/// YAML and a typo shouldn't abort the whole dev-shell invocation.
pub fn load_or_warn(path: &Path) -> Option<Manifest> {
    match load(path) {
        Ok(manifest) => Some(manifest),
        Err(err) => {
            tracing::warn!(%err, path = %path.display(), "skipping unreadable manifest");
            None
        },
    }
}

/// Locate the first recognized manifest in `project_root`, then in
/// `~/.dotfiles`.
pub fn find_manifest(project_root: &Path) -> Option<PathBuf> {
    let mut search_dirs = vec![project_root.to_path_buf()];
    if let Some(home) = dirs::home_dir() {
        search_dirs.push(home.join(".dotfiles"));
    }

    for dir in search_dirs {
        for filename in RECOGNIZED_FILENAMES {
            let candidate = dir.join(filename);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Well-known project markers consulted (in addition to manifest files) by
/// the shell-integration `chpwd` hook when deciding whether a directory is
/// "a project" worth activating an environment for.
pub const PROJECT_MARKERS: &[&str] =
    &["Cargo.toml", "pyproject.toml", "go.mod", "Gemfile", "package.json"];

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::path::Path;

    #[test]
    fn empty_dependencies_section_resolves_to_no_packages() {
        let manifest = parse("dependencies:\n", Path::new("deps.yaml")).unwrap();
        assert!(manifest.dependencies.is_empty());
    }

    #[test]
    fn simple_and_extended_entries_normalize_to_the_same_shape() {
        let yaml = indoc! {"
            dependencies:
              nodejs.org: ^20
              bun.sh:
                version: ~1.1
                global: true
            global: false
        "};
        let manifest = parse(yaml, Path::new("deps.yaml")).unwrap();
        let node = manifest
            .dependencies
            .iter()
            .find(|d| d.domain == "nodejs.org")
            .unwrap();
        assert_eq!(node.constraint.as_deref(), Some("^20"));
        assert!(!node.global);

        let bun = manifest
            .dependencies
            .iter()
            .find(|d| d.domain == "bun.sh")
            .unwrap();
        assert_eq!(bun.constraint.as_deref(), Some("~1.1"));
        assert!(bun.global);
    }

    #[test]
    fn file_scope_global_is_inherited_when_not_overridden() {
        let yaml = indoc! {"
            global: true
            dependencies:
              bun.sh: latest
        "};
        let manifest = parse(yaml, Path::new("deps.yaml")).unwrap();
        assert!(manifest.dependencies[0].global);
    }

    #[test]
    fn env_and_services_sections_are_parsed() {
        let yaml = indoc! {"
            dependencies: {}
            env:
              FOO: bar
            services:
              enabled: true
              autoStart: [postgresql.org]
        "};
        let manifest = parse(yaml, Path::new("deps.yaml")).unwrap();
        assert_eq!(manifest.env.get("FOO"), Some(&"bar".to_string()));
        assert!(manifest.services.enabled);
        assert_eq!(manifest.services.auto_start, vec!["postgresql.org".to_string()]);
    }

    #[test]
    fn malformed_yaml_is_a_recoverable_error() {
        let err = parse("dependencies: [this is not a mapping", Path::new("deps.yaml"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::Yaml { .. }));
    }

    #[test]
    fn find_manifest_prefers_project_root_over_dotfiles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("deps.yaml"), "dependencies: {}\n").unwrap();
        let found = find_manifest(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("deps.yaml"));
    }
}
