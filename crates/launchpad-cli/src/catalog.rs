//! The concrete `Catalog` the CLI runs against. The catalog's real backing
//! store (a distribution-mirror-synced index) is out of scope for this
//! core; this is a thin file-backed loader so the CLI has something real
//! to resolve against, falling back to an empty catalog rather than
//! failing when no snapshot is available.

use std::path::{Path, PathBuf};

use launchpad_core::catalog::{Catalog, FixtureCatalog};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct CatalogEntryFile {
    #[serde(default)]
    versions: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

pub fn default_catalog_path(data_dir: &Path) -> PathBuf {
    data_dir.join("catalog.json")
}

/// Load a catalog snapshot from `path`. A missing or malformed file yields
/// an empty catalog (with a warning) rather than aborting — consistent
/// with the rest of launchpad treating catalog lookups as infallible.
pub fn load(path: &Path) -> FixtureCatalog {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(path = %path.display(), %err, "no catalog snapshot found, starting with an empty catalog");
            return FixtureCatalog::new();
        },
    };

    let entries: std::collections::BTreeMap<String, CatalogEntryFile> = match serde_json::from_str(&contents) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %path.display(), %err, "catalog snapshot is malformed, starting with an empty catalog");
            return FixtureCatalog::new();
        },
    };

    entries
        .into_iter()
        .fold(FixtureCatalog::new(), |catalog, (domain, entry)| {
            catalog.with_package(domain, entry.versions, entry.dependencies)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_empty_catalog() {
        let catalog = load(Path::new("/nonexistent/catalog.json"));
        assert!(catalog.versions("nodejs.org").is_empty());
    }

    #[test]
    fn loads_versions_and_dependencies_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"nodejs.org": {"versions": ["20.0.0", "18.0.0"], "dependencies": ["openssl.org"]}}"#,
        )
        .unwrap();

        let catalog = load(&path);
        assert_eq!(catalog.versions("nodejs.org"), vec!["20.0.0", "18.0.0"]);
        assert_eq!(catalog.info("nodejs.org").unwrap().dependencies, vec!["openssl.org"]);
    }
}
