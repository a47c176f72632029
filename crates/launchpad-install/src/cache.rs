//! Content-addressed archive cache (spec §4.5).
//!
//! Integrity beyond "the file is present and non-empty" is deferred to the
//! extractor: a corrupted archive fails at extraction time and the caller
//! evicts it and re-downloads, rather than this module trying to validate
//! checksums it was never given.

use std::path::{Path, PathBuf};

/// The filename extension archives are stored under. Packages are
/// distributed as gzipped tarballs.
pub const ARCHIVE_EXT: &str = "tar.gz";

#[derive(Debug, Clone)]
pub struct Cache {
    root: PathBuf,
}

impl Cache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$XDG_CACHE_HOME/launchpad/binaries` by default.
    pub fn from_xdg() -> std::io::Result<Self> {
        let base = xdg::BaseDirectories::with_prefix("launchpad")
            .get_cache_home()
            .ok_or_else(|| std::io::Error::other("no cache home available"))?;
        Ok(Self::new(base.join("binaries")))
    }

    pub fn entry_dir(&self, domain: &str, version: &str) -> PathBuf {
        self.root.join("packages").join(format!("{domain}-{version}"))
    }

    pub fn archive_path(&self, domain: &str, version: &str) -> PathBuf {
        self.entry_dir(domain, version).join(format!("package.{ARCHIVE_EXT}"))
    }

    /// A cache hit is a present, non-empty file at the canonical path.
    pub fn lookup(&self, domain: &str, version: &str) -> Option<PathBuf> {
        let path = self.archive_path(domain, version);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.len() > 0 => Some(path),
            _ => None,
        }
    }

    /// Remove a corrupted entry so the next lookup misses and triggers a
    /// re-download.
    pub fn evict(&self, domain: &str, version: &str) -> std::io::Result<()> {
        let path = self.archive_path(domain, version);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Reserve (creating parent directories) the path a fresh download
    /// should be streamed into, as a temp file to be renamed atomically on
    /// completion.
    pub fn staging_path(&self, domain: &str, version: &str) -> std::io::Result<PathBuf> {
        let dir = self.entry_dir(domain, version);
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join(format!("package.{ARCHIVE_EXT}.tmp")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_when_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        assert!(cache.lookup("nodejs.org", "20.0.0").is_none());
    }

    #[test]
    fn miss_when_file_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let path = cache.archive_path("nodejs.org", "20.0.0");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, []).unwrap();
        assert!(cache.lookup("nodejs.org", "20.0.0").is_none());
    }

    #[test]
    fn hit_when_file_nonempty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        let path = cache.archive_path("nodejs.org", "20.0.0");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"fake archive").unwrap();
        assert_eq!(cache.lookup("nodejs.org", "20.0.0"), Some(path));
    }

    #[test]
    fn distinct_versions_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path());
        assert_ne!(
            cache.archive_path("nodejs.org", "20.0.0"),
            cache.archive_path("nodejs.org", "18.0.0")
        );
    }
}
