//! Shared data model (spec §3): the structures that flow between the
//! resolver, installer, and environment engine.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single node of the resolved dependency graph. The resolver guarantees
/// `version` is an element of the catalog's version list for `domain`, and
/// that at most one `ResolvedPackage` per domain appears in a resolution
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub domain: String,
    pub version: String,
    pub platform: String,
    pub arch: String,
    pub dependencies: Vec<ResolvedPackage>,
    pub is_global: bool,
}

impl ResolvedPackage {
    pub fn key(&self) -> (String, String) {
        (self.domain.clone(), self.version.clone())
    }
}

/// The on-disk metadata record written by the installer for each package
/// it installs. Its presence is the contract: a package is visible in the
/// environment's binary listing iff this file exists, even if some of the
/// listed binaries have since gone missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub domain: String,
    pub version: String,
    #[serde(rename = "installedAt")]
    pub installed_at: String,
    pub binaries: Vec<String>,
    #[serde(rename = "installPath")]
    pub install_path: PathBuf,
}

/// A project-scoped environment: the materialized result of installing a
/// resolved package set under a unique root.
#[derive(Debug, Clone)]
pub struct Environment {
    pub id: String,
    pub root: PathBuf,
    pub bin_dir: PathBuf,
    pub lib_dir: PathBuf,
    pub pkgs_dir: PathBuf,
    pub packages: BTreeMap<String, InstalledPackage>,
}

impl Environment {
    pub fn new(id: impl Into<String>, root: PathBuf) -> Self {
        let id = id.into();
        Self {
            bin_dir: root.join("bin"),
            lib_dir: root.join("lib"),
            pkgs_dir: root.join("pkgs"),
            packages: BTreeMap::new(),
            id,
            root,
        }
    }
}
